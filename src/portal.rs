use chrono::{DateTime, Datelike, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info};
use uuid::Uuid;

use crate::account::{Account, AccountRecord, PaymentHistoryEntry};
use crate::config::PortalConfig;
use crate::customer_id::{derive_customer_id, resolve_unique};
use crate::decimal::Money;
use crate::documents::{DocumentBundle, DocumentFile, DocumentUpload};
use crate::errors::{PortalError, Result};
use crate::events::{Event, EventStore};
use crate::notifications::Notification;
use crate::reconcile::{apply_payment, PaymentReceipt};
use crate::schedule::{generate_schedule, Installment};
use crate::serialization::{receipt_lines, AccountView, ReceiptLine};
use crate::store::{BlobStore, IdentityProvider, PortalStore};
use crate::types::{AccountId, DocumentCategory};

/// everything a new customer submits at registration
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub mobile: String,
    pub gender: Option<String>,
    pub photo: Option<DocumentFile>,
    pub principal: Money,
    pub term_months: u32,
    pub documents: Vec<DocumentUpload>,
}

/// what registration hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    pub uid: AccountId,
    pub customer_id: String,
    pub position: u32,
}

/// portal service: one instance per deployment, one store commit per operation
///
/// Every mutation loads the account's versioned record, applies a pure
/// transition, and commits conditionally. A concurrent writer surfaces as
/// `VersionConflict`; nothing is half-applied.
pub struct LoanPortal<S, B, I> {
    config: PortalConfig,
    store: S,
    blobs: B,
    identity: I,
    pub events: EventStore,
}

impl<S: PortalStore, B: BlobStore, I: IdentityProvider> LoanPortal<S, B, I> {
    pub fn new(config: PortalConfig, store: S, blobs: B, identity: I) -> Self {
        Self {
            config,
            store,
            blobs,
            identity,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// register a new account: credentials, customer id, schedule, documents
    ///
    /// All validation happens before any external write. The account record
    /// (profile, full installment schedule, optional document bundles,
    /// welcome notification) is created in one store call.
    pub fn register(
        &mut self,
        request: RegistrationRequest,
        time: &SafeTimeProvider,
    ) -> Result<RegistrationOutcome> {
        let now = time.now();

        let first_initial = required_initial(&request.first_name, "first_name")?;
        let last_initial = required_initial(&request.last_name, "last_name")?;
        require_nonempty(&request.email, "email")?;
        require_nonempty(&request.password, "password")?;
        require_nonempty(&request.mobile, "mobile")?;

        // a request carrying two bundles of one category can never attach both
        for (i, upload) in request.documents.iter().enumerate() {
            if request.documents[..i].iter().any(|u| u.category == upload.category) {
                return Err(PortalError::DocumentsAlreadyUploaded {
                    category: upload.category,
                });
            }
        }

        let tier = self
            .config
            .rate_table
            .validate(request.principal, request.term_months)?;
        let loan_type = tier.code;

        let position = self.store.count()? as u32 + 1;

        let base_id = derive_customer_id(
            loan_type,
            request.term_months,
            now.year(),
            first_initial,
            last_initial,
            position,
        )?;
        let (customer_id, collided) =
            resolve_unique(base_id.clone(), |candidate| self.store.customer_id_taken(candidate))?;

        let installments = generate_schedule(
            &self.config.rate_table,
            request.principal,
            request.term_months,
            position,
            time,
        )?;
        let next_due_date = installments.first().map(|i| i.due_date);

        let uid = Uuid::new_v4();

        let photo_url = match &request.photo {
            Some(photo) => Some(self.blobs.put(
                &format!("profileImages/{}/{}", uid, photo.name),
                &photo.bytes,
            )?),
            None => None,
        };

        let account = Account {
            uid,
            customer_id: customer_id.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            mobile: request.mobile.clone(),
            date_of_birth: request.date_of_birth,
            gender: request.gender.clone(),
            photo_url,
            loan_type,
            principal: request.principal,
            term_months: request.term_months,
            position,
            total_months_paid: 0,
            total_amount_paid: Money::ZERO,
            paid_months: Vec::new(),
            next_due_date,
            customer_document_uploaded: false,
            guarantor_document_uploaded: false,
            logged_in: false,
            created_at: now,
            updated_at: now,
        };

        let mut record = AccountRecord::new(account, installments);

        for upload in &request.documents {
            let bundle = self.upload_bundle(uid, upload, now)?;
            record.attach_documents(bundle, now)?;
            self.events.emit(Event::DocumentsUploaded {
                uid,
                category: upload.category,
                file_count: upload.files.len(),
                timestamp: now,
            });
        }

        self.notify(
            &mut record,
            "Registration Successful",
            format!("Hello, {}!", request.first_name),
            now,
        );

        // last fallible external step before the record exists: an earlier
        // failure leaves the email unregistered, so a corrected retry works
        self.identity
            .create_credentials(&request.email, &request.password)?;

        self.store.create(uid, record)?;

        if collided {
            self.events.emit(Event::CustomerIdCollisionResolved {
                uid,
                base: base_id,
                assigned: customer_id.clone(),
                timestamp: now,
            });
        }
        self.events.emit(Event::AccountRegistered {
            uid,
            customer_id: customer_id.clone(),
            position,
            principal: request.principal,
            term_months: request.term_months,
            timestamp: now,
        });

        info!(%uid, %customer_id, position, "account registered");

        Ok(RegistrationOutcome {
            uid,
            customer_id,
            position,
        })
    }

    /// log in with email and password
    pub fn login_by_email(
        &mut self,
        email: &str,
        password: &str,
        time: &SafeTimeProvider,
    ) -> Result<AccountId> {
        let uid = self
            .store
            .find_by_email(email)?
            .ok_or_else(|| PortalError::EmailNotFound {
                email: email.to_string(),
            })?;
        self.open_session(uid, password, false, time)
    }

    /// log in with customer id and password
    pub fn login_by_customer_id(
        &mut self,
        customer_id: &str,
        password: &str,
        time: &SafeTimeProvider,
    ) -> Result<AccountId> {
        let uid = self
            .store
            .find_by_customer_id(customer_id)?
            .ok_or_else(|| PortalError::CustomerIdNotFound {
                customer_id: customer_id.to_string(),
            })?;
        self.open_session(uid, password, true, time)
    }

    fn open_session(
        &mut self,
        uid: AccountId,
        password: &str,
        welcome_back: bool,
        time: &SafeTimeProvider,
    ) -> Result<AccountId> {
        let now = time.now();
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;

        if record.account.logged_in {
            return Err(PortalError::AlreadyLoggedIn);
        }

        self.identity.authenticate(&record.account.email, password)?;

        record.account.logged_in = true;
        record.account.updated_at = now;
        if welcome_back {
            self.notify(
                &mut record,
                "Welcome Back!",
                "We're glad to see you again!",
                now,
            );
        }

        self.store.commit(uid, loaded.version, record)?;
        self.events.emit(Event::SessionOpened { uid, timestamp: now });
        debug!(%uid, "session opened");
        Ok(uid)
    }

    /// clear the session flag and invalidate the provider session
    pub fn sign_out(&mut self, uid: AccountId, time: &SafeTimeProvider) -> Result<()> {
        let now = time.now();
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;

        if !record.account.logged_in {
            return Ok(());
        }

        record.account.logged_in = false;
        record.account.updated_at = now;
        let email = record.account.email.clone();

        self.store.commit(uid, loaded.version, record)?;
        self.identity.invalidate_session(&email)?;
        self.events.emit(Event::SessionClosed { uid, timestamp: now });
        debug!(%uid, "session closed");
        Ok(())
    }

    /// re-authenticate with the old password, then rotate it
    pub fn change_password(
        &mut self,
        customer_id: &str,
        old_password: &str,
        new_password: &str,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        require_nonempty(new_password, "password")?;
        let uid = self
            .store
            .find_by_customer_id(customer_id)?
            .ok_or_else(|| PortalError::CustomerIdNotFound {
                customer_id: customer_id.to_string(),
            })?;
        let record = self.store.load(uid)?.value;

        self.identity
            .authenticate(&record.account.email, old_password)?;
        self.identity
            .update_password(&record.account.email, new_password)?;
        self.events.emit(Event::PasswordChanged {
            uid,
            timestamp: time.now(),
        });
        Ok(())
    }

    /// look up the customer id for a registered email
    pub fn forgot_customer_id(&self, email: &str) -> Result<String> {
        let uid = self
            .store
            .find_by_email(email)?
            .ok_or_else(|| PortalError::EmailNotFound {
                email: email.to_string(),
            })?;
        Ok(self.store.load(uid)?.value.account.customer_id)
    }

    /// upload a document bundle for one category
    ///
    /// The conflict check runs before any file leaves for the blob store, so
    /// a rejected upload stores nothing.
    pub fn upload_documents(
        &mut self,
        uid: AccountId,
        upload: DocumentUpload,
        time: &SafeTimeProvider,
    ) -> Result<Vec<String>> {
        let now = time.now();
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;

        if record.document(upload.category).is_some() {
            return Err(PortalError::DocumentsAlreadyUploaded {
                category: upload.category,
            });
        }

        let bundle = self.upload_bundle(uid, &upload, now)?;
        let file_urls = bundle.file_urls.clone();
        record.attach_documents(bundle, now)?;

        let title = match upload.category {
            DocumentCategory::Customer => "Customer Document Uploaded",
            DocumentCategory::Guarantor => "Guarantor Document Uploaded",
        };
        self.notify(
            &mut record,
            title,
            format!("{} has been successfully uploaded.", upload.category),
            now,
        );

        self.store.commit(uid, loaded.version, record)?;
        self.events.emit(Event::DocumentsUploaded {
            uid,
            category: upload.category,
            file_count: file_urls.len(),
            timestamp: now,
        });
        Ok(file_urls)
    }

    /// remove a category's bundle and recompute the uploaded flags
    pub fn remove_documents(
        &mut self,
        uid: AccountId,
        category: DocumentCategory,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let now = time.now();
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;

        record.remove_documents(category, now)?;

        self.store.commit(uid, loaded.version, record)?;
        self.events.emit(Event::DocumentsRemoved {
            uid,
            category,
            timestamp: now,
        });
        Ok(())
    }

    /// reconcile a confirmed payment against one installment month
    ///
    /// Idempotent per external transaction reference: a replayed callback
    /// returns the original receipt and commits nothing. Concurrent calls
    /// for the same month race on the record version; the loser gets
    /// `VersionConflict` and finds the month already paid on retry.
    pub fn pay_installment(
        &mut self,
        uid: AccountId,
        month: u32,
        amount: Money,
        transaction_ref: &str,
        time: &SafeTimeProvider,
    ) -> Result<PaymentReceipt> {
        let now = time.now();
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;

        let receipt = apply_payment(
            &mut record,
            month,
            amount,
            transaction_ref,
            now,
            &mut self.events,
        )?;

        if receipt.replayed {
            return Ok(receipt);
        }

        let body = match receipt.next_due_date {
            Some(next) => format!(
                "RS {}, amount paid successfully. Your next due date is {}.",
                amount,
                next.format("%Y-%m-%d")
            ),
            None => format!(
                "RS {}, amount paid successfully. All installments are settled.",
                amount
            ),
        };
        self.notify(&mut record, "Payment Updated", body, now);

        self.store.commit(uid, loaded.version, record)?;
        info!(%uid, month, %amount, transaction_ref, "installment reconciled");
        Ok(receipt)
    }

    pub fn account(&self, uid: AccountId) -> Result<Account> {
        Ok(self.store.load(uid)?.value.account)
    }

    pub fn installments(&self, uid: AccountId) -> Result<Vec<Installment>> {
        Ok(self.store.load(uid)?.value.installments)
    }

    pub fn payment_history(&self, uid: AccountId) -> Result<Vec<PaymentHistoryEntry>> {
        Ok(self.store.load(uid)?.value.payment_history)
    }

    /// printable receipt lines, oldest payment first
    pub fn receipt_lines(&self, uid: AccountId) -> Result<Vec<ReceiptLine>> {
        Ok(receipt_lines(&self.store.load(uid)?.value))
    }

    /// serializable snapshot of the whole account
    pub fn account_view(&self, uid: AccountId) -> Result<AccountView> {
        Ok(AccountView::from_record(&self.store.load(uid)?.value))
    }

    /// notifications still inside their visibility window
    pub fn visible_notifications(
        &self,
        uid: AccountId,
        time: &SafeTimeProvider,
    ) -> Result<Vec<Notification>> {
        let record = self.store.load(uid)?.value;
        let now = time.now();
        Ok(record
            .visible_notifications(now)
            .into_iter()
            .cloned()
            .collect())
    }

    /// explicit user dismissal of one notification
    pub fn dismiss_notification(
        &mut self,
        uid: AccountId,
        notification_id: Uuid,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;
        record.dismiss_notification(notification_id)?;
        self.store.commit(uid, loaded.version, record)?;
        self.events.emit(Event::NotificationDismissed {
            uid,
            notification_id,
            timestamp: time.now(),
        });
        Ok(())
    }

    /// physically remove expired notifications
    pub fn sweep_notifications(
        &mut self,
        uid: AccountId,
        time: &SafeTimeProvider,
    ) -> Result<usize> {
        let now = time.now();
        let loaded = self.store.load(uid)?;
        let mut record = loaded.value;

        let removed = record.sweep_notifications(now);
        if removed > 0 {
            self.store.commit(uid, loaded.version, record)?;
            self.events.emit(Event::NotificationsSwept {
                uid,
                removed,
                timestamp: now,
            });
        }
        Ok(removed)
    }

    fn upload_bundle(
        &self,
        uid: AccountId,
        upload: &DocumentUpload,
        now: DateTime<Utc>,
    ) -> Result<DocumentBundle> {
        let mut file_urls = Vec::with_capacity(upload.files.len());
        for file in &upload.files {
            let url = self.blobs.put(
                &format!("documents/{}/{}/{}", uid, upload.category, file.name),
                &file.bytes,
            )?;
            file_urls.push(url);
        }
        Ok(DocumentBundle::new(
            upload.category,
            file_urls,
            upload.fields.clone(),
            now,
        ))
    }

    fn notify(
        &mut self,
        record: &mut AccountRecord,
        title: &str,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let notification =
            Notification::new(title, body, now, self.config.notification_ttl_minutes);
        let notification_id = record.post_notification(notification);
        self.events.emit(Event::NotificationPosted {
            uid: record.account.uid,
            notification_id,
            title: title.to_string(),
            timestamp: now,
        });
    }
}

fn require_nonempty(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortalError::MissingField { field });
    }
    Ok(())
}

fn required_initial(value: &str, field: &'static str) -> Result<char> {
    value
        .trim()
        .chars()
        .next()
        .ok_or(PortalError::MissingField { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentFields;
    use crate::store::{MemoryBlobStore, MemoryIdentity, MemoryStore};
    use crate::types::InstallmentStatus;
    use chrono::{Datelike, TimeZone};
    use hourglass_rs::TimeSource;

    fn portal() -> LoanPortal<MemoryStore, MemoryBlobStore, MemoryIdentity> {
        LoanPortal::new(
            PortalConfig::standard(),
            MemoryStore::new(),
            MemoryBlobStore::new(),
            MemoryIdentity::new(),
        )
    }

    fn time_at(year: i32, month: u32, day: u32) -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
        ))
    }

    fn registration(email: &str, first: &str, last: &str) -> RegistrationRequest {
        RegistrationRequest {
            email: email.to_string(),
            password: "secret".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
            mobile: "9876543210".to_string(),
            gender: None,
            photo: None,
            principal: Money::from_major(10_000),
            term_months: 12,
            documents: Vec::new(),
        }
    }

    #[test]
    fn test_end_to_end_register_pay_replay() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let outcome = portal
            .register(registration("ravi@example.com", "Ravi", "Kumar"), &time)
            .unwrap();
        assert_eq!(outcome.position, 1);
        assert_eq!(outcome.customer_id, "E1225RKA");

        // 12 installments, EMI 1135, bucket A (due-day 2), month 1 pending
        let installments = portal.installments(outcome.uid).unwrap();
        assert_eq!(installments.len(), 12);
        assert_eq!(installments[0].status, InstallmentStatus::Pending);
        assert_eq!(installments[0].amount, Money::from_major(1_135));
        assert_eq!(installments[0].due_date.day(), 2);
        assert_eq!(installments[0].category, 'A');
        for installment in &installments[1..] {
            assert_eq!(installment.status, InstallmentStatus::Upcoming);
        }

        // pay month 1
        let receipt = portal
            .pay_installment(outcome.uid, 1, Money::from_major(1_135), "TXN1", &time)
            .unwrap();
        assert!(!receipt.replayed);

        let account = portal.account(outcome.uid).unwrap();
        assert_eq!(account.total_months_paid, 1);
        assert_eq!(account.total_amount_paid, Money::from_major(1_135));
        let history = portal.payment_history(outcome.uid).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].transaction_ref, "TXN1");
        let lines = portal.receipt_lines(outcome.uid).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].month_label, "Month 1");

        // replay the same callback: state unchanged
        let replay = portal
            .pay_installment(outcome.uid, 1, Money::from_major(1_135), "TXN1", &time)
            .unwrap();
        assert!(replay.replayed);
        let account = portal.account(outcome.uid).unwrap();
        assert_eq!(account.total_months_paid, 1);
        assert_eq!(account.total_amount_paid, Money::from_major(1_135));
        assert_eq!(portal.payment_history(outcome.uid).unwrap().len(), 1);
    }

    #[test]
    fn test_validation_rejected_before_any_write() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let mut bad_term = registration("a@x.com", "Asha", "Nair");
        bad_term.term_months = 24;
        assert!(portal.register(bad_term, &time).is_err());

        let mut bad_tier = registration("a@x.com", "Asha", "Nair");
        bad_tier.principal = Money::from_major(12_345);
        assert!(portal.register(bad_tier, &time).is_err());

        // nothing was created
        assert_eq!(portal.store().count().unwrap(), 0);
        assert!(portal.login_by_email("a@x.com", "secret", &time).is_err());
    }

    #[test]
    fn test_rejected_registration_leaves_email_usable() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let upload = DocumentUpload {
            category: DocumentCategory::Customer,
            files: vec![DocumentFile {
                name: "aadhaar.pdf".to_string(),
                bytes: b"pdf".to_vec(),
            }],
            fields: DocumentFields::default(),
        };

        // two bundles for one category in a single request
        let mut bad = registration("ravi@example.com", "Ravi", "Kumar");
        bad.documents = vec![upload.clone(), upload.clone()];
        let err = portal.register(bad, &time).unwrap_err();
        assert!(matches!(err, PortalError::DocumentsAlreadyUploaded { .. }));

        // no account, no credentials, no blobs left behind
        assert_eq!(portal.store().count().unwrap(), 0);
        assert!(portal.blobs.is_empty());

        // a corrected retry with the same email succeeds
        let mut fixed = registration("ravi@example.com", "Ravi", "Kumar");
        fixed.documents = vec![upload];
        let outcome = portal.register(fixed, &time).unwrap();
        assert_eq!(outcome.position, 1);
        portal
            .login_by_email("ravi@example.com", "secret", &time)
            .unwrap();
    }

    #[test]
    fn test_positions_and_buckets_advance_with_registrations() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        for i in 0..11 {
            let email = format!("user{}@example.com", i);
            let outcome = portal
                .register(registration(&email, "Asha", "Nair"), &time)
                .unwrap();
            assert_eq!(outcome.position, i + 1);
        }

        // the eleventh registration lands in bucket B
        let uid = portal
            .store()
            .find_by_email("user10@example.com")
            .unwrap()
            .unwrap();
        let installments = portal.installments(uid).unwrap();
        assert_eq!(installments[0].category, 'B');
        assert_eq!(installments[0].due_date.day(), 10);
    }

    #[test]
    fn test_customer_id_collision_resolved_with_suffix() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        // positions 1 and 2 share bucket A; identical initials and tier
        // produce the same base id
        let first = portal
            .register(registration("one@example.com", "Ravi", "Kumar"), &time)
            .unwrap();
        let second = portal
            .register(registration("two@example.com", "Rohit", "Khanna"), &time)
            .unwrap();

        assert_eq!(first.customer_id, "E1225RKA");
        assert_eq!(second.customer_id, "E1225RKA-2");
        assert!(portal
            .take_events()
            .iter()
            .any(|e| matches!(e, Event::CustomerIdCollisionResolved { .. })));
    }

    #[test]
    fn test_login_exclusion_and_sign_out() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let outcome = portal
            .register(registration("ravi@example.com", "Ravi", "Kumar"), &time)
            .unwrap();

        let uid = portal
            .login_by_email("ravi@example.com", "secret", &time)
            .unwrap();
        assert_eq!(uid, outcome.uid);

        // second device is rejected while the session is open
        let err = portal
            .login_by_customer_id(&outcome.customer_id, "secret", &time)
            .unwrap_err();
        assert!(matches!(err, PortalError::AlreadyLoggedIn));

        portal.sign_out(uid, &time).unwrap();
        portal
            .login_by_customer_id(&outcome.customer_id, "secret", &time)
            .unwrap();

        // wrong password never opens a session
        portal.sign_out(uid, &time).unwrap();
        let err = portal
            .login_by_email("ravi@example.com", "wrong", &time)
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidCredentials));
    }

    #[test]
    fn test_forgot_customer_id_and_change_password() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let outcome = portal
            .register(registration("ravi@example.com", "Ravi", "Kumar"), &time)
            .unwrap();

        assert_eq!(
            portal.forgot_customer_id("ravi@example.com").unwrap(),
            outcome.customer_id
        );
        assert!(portal.forgot_customer_id("nobody@example.com").is_err());

        portal
            .change_password(&outcome.customer_id, "secret", "rotated", &time)
            .unwrap();
        portal
            .login_by_email("ravi@example.com", "rotated", &time)
            .unwrap();

        // old password no longer valid
        portal.sign_out(outcome.uid, &time).unwrap();
        assert!(portal
            .change_password(&outcome.customer_id, "secret", "again", &time)
            .is_err());
    }

    #[test]
    fn test_duplicate_document_upload_rejected() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let outcome = portal
            .register(registration("ravi@example.com", "Ravi", "Kumar"), &time)
            .unwrap();

        let upload = DocumentUpload {
            category: DocumentCategory::Customer,
            files: vec![DocumentFile {
                name: "aadhaar.pdf".to_string(),
                bytes: b"pdf".to_vec(),
            }],
            fields: DocumentFields {
                id_numbers: vec!["1234-5678-9012".to_string()],
                relationship: None,
            },
        };

        let urls = portal
            .upload_documents(outcome.uid, upload.clone(), &time)
            .unwrap();
        assert_eq!(urls.len(), 1);
        assert!(portal.account(outcome.uid).unwrap().customer_document_uploaded);

        let err = portal
            .upload_documents(outcome.uid, upload, &time)
            .unwrap_err();
        assert!(matches!(err, PortalError::DocumentsAlreadyUploaded { .. }));

        // first bundle intact; no extra blob was stored
        assert_eq!(portal.store().load(outcome.uid).unwrap().value.documents.len(), 1);
        assert_eq!(portal.blobs.len(), 1);

        portal
            .remove_documents(outcome.uid, DocumentCategory::Customer, &time)
            .unwrap();
        assert!(!portal.account(outcome.uid).unwrap().customer_document_uploaded);
    }

    #[test]
    fn test_notifications_expire_and_sweep() {
        let mut portal = portal();
        let registered_at = time_at(2025, 3, 20);

        let outcome = portal
            .register(registration("ravi@example.com", "Ravi", "Kumar"), &registered_at)
            .unwrap();

        // registration notification visible right away
        let visible = portal
            .visible_notifications(outcome.uid, &registered_at)
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Registration Successful");

        // a day later it is expired, filtered at read time, then swept
        let later = time_at(2025, 3, 21);
        assert!(portal
            .visible_notifications(outcome.uid, &later)
            .unwrap()
            .is_empty());
        assert_eq!(portal.sweep_notifications(outcome.uid, &later).unwrap(), 1);
        assert_eq!(portal.sweep_notifications(outcome.uid, &later).unwrap(), 0);
    }

    #[test]
    fn test_paying_all_months_settles_the_loan() {
        let mut portal = portal();
        let time = time_at(2025, 3, 20);

        let outcome = portal
            .register(registration("ravi@example.com", "Ravi", "Kumar"), &time)
            .unwrap();

        for month in 1..=12u32 {
            portal
                .pay_installment(
                    outcome.uid,
                    month,
                    Money::from_major(1_135),
                    &format!("TXN{}", month),
                    &time,
                )
                .unwrap();
        }

        let account = portal.account(outcome.uid).unwrap();
        assert!(account.is_fully_paid());
        assert_eq!(account.next_due_date, None);
        assert_eq!(account.total_amount_paid, Money::from_major(13_620));
        assert_eq!(portal.payment_history(outcome.uid).unwrap().len(), 12);

        // month 13 does not exist
        let err = portal
            .pay_installment(outcome.uid, 13, Money::from_major(1_135), "TXN13", &time)
            .unwrap_err();
        assert!(matches!(err, PortalError::MissingDueDate { month: 13 }));
    }
}
