pub mod account;
pub mod config;
pub mod customer_id;
pub mod decimal;
pub mod documents;
pub mod errors;
pub mod events;
pub mod notifications;
pub mod portal;
pub mod reconcile;
pub mod schedule;
pub mod serialization;
pub mod store;
pub mod types;

// re-export key types
pub use account::{Account, AccountRecord, PaymentHistoryEntry};
pub use config::{EmiTier, PortalConfig, PositionBucket, RateTable};
pub use customer_id::{derive_customer_id, resolve_unique};
pub use decimal::Money;
pub use documents::{DocumentBundle, DocumentFields, DocumentFile, DocumentUpload};
pub use errors::{PortalError, Result};
pub use events::{Event, EventStore};
pub use notifications::Notification;
pub use portal::{LoanPortal, RegistrationOutcome, RegistrationRequest};
pub use reconcile::{apply_payment, PaymentReceipt};
pub use schedule::{generate_schedule, Installment};
pub use serialization::{receipt_lines, AccountView, ReceiptLine};
pub use store::{
    BlobStore, IdentityProvider, MemoryBlobStore, MemoryIdentity, MemoryStore, PortalStore,
    Versioned,
};
pub use types::{AccountId, DocumentCategory, InstallmentStatus};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
