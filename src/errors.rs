use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::DocumentCategory;

#[derive(Error, Debug)]
pub enum PortalError {
    // validation errors, rejected before any write
    #[error("unknown principal tier: {principal}")]
    UnknownPrincipalTier {
        principal: Money,
    },

    #[error("term of {requested} months not allowed for principal {principal} (allowed: {allowed:?})")]
    InvalidTermLength {
        principal: Money,
        requested: u32,
        allowed: Vec<u32>,
    },

    #[error("invalid registration position: {position}")]
    InvalidPosition {
        position: u32,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("missing required field: {field}")]
    MissingField {
        field: &'static str,
    },

    // conflict errors, surfaced as "already exists" rather than swallowed
    #[error("documents already uploaded for category {category}")]
    DocumentsAlreadyUploaded {
        category: DocumentCategory,
    },

    #[error("account already exists: {uid}")]
    AccountAlreadyExists {
        uid: Uuid,
    },

    #[error("installment for month {month} is already paid")]
    InstallmentAlreadyPaid {
        month: u32,
    },

    #[error("credentials already exist for {email}")]
    CredentialsAlreadyExist {
        email: String,
    },

    #[error("account is already logged in on another device")]
    AlreadyLoggedIn,

    #[error("record was modified concurrently: expected version {expected}, found {found}")]
    VersionConflict {
        expected: u64,
        found: u64,
    },

    // consistency errors, fatal to the current operation
    #[error("due date not found for installment month {month}")]
    MissingDueDate {
        month: u32,
    },

    #[error("account not found: {uid}")]
    AccountNotFound {
        uid: Uuid,
    },

    #[error("no documents uploaded for category {category}")]
    DocumentsNotFound {
        category: DocumentCategory,
    },

    #[error("notification not found: {id}")]
    NotificationNotFound {
        id: Uuid,
    },

    #[error("no account associated with customer id {customer_id}")]
    CustomerIdNotFound {
        customer_id: String,
    },

    #[error("no account associated with email {email}")]
    EmailNotFound {
        email: String,
    },

    #[error("invalid credentials")]
    InvalidCredentials,

    // remote i/o errors, wrapped with the underlying cause
    #[error("storage operation failed: {message}")]
    Storage {
        message: String,
    },

    #[error("file upload failed: {message}")]
    Upload {
        message: String,
    },
}

impl PortalError {
    pub fn storage(message: impl Into<String>) -> Self {
        PortalError::Storage {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        PortalError::Upload {
            message: message.into(),
        }
    }

    /// true for errors a caller can fix by changing the request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PortalError::UnknownPrincipalTier { .. }
                | PortalError::InvalidTermLength { .. }
                | PortalError::InvalidPosition { .. }
                | PortalError::InvalidPaymentAmount { .. }
                | PortalError::MissingField { .. }
        )
    }

    /// true for "already exists" style conflicts
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            PortalError::DocumentsAlreadyUploaded { .. }
                | PortalError::AccountAlreadyExists { .. }
                | PortalError::CredentialsAlreadyExist { .. }
                | PortalError::InstallmentAlreadyPaid { .. }
                | PortalError::AlreadyLoggedIn
                | PortalError::VersionConflict { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
