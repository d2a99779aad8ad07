use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::documents::DocumentBundle;
use crate::errors::{PortalError, Result};
use crate::notifications::Notification;
use crate::schedule::Installment;
use crate::types::{AccountId, DocumentCategory};

/// account profile and aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    // identification
    pub uid: AccountId,
    pub customer_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub photo_url: Option<String>,

    // loan terms
    pub loan_type: char,
    pub principal: Money,
    pub term_months: u32,
    pub position: u32,

    // aggregate payment totals
    pub total_months_paid: u32,
    pub total_amount_paid: Money,
    pub paid_months: Vec<u32>,
    pub next_due_date: Option<DateTime<Utc>>,

    // flags
    pub customer_document_uploaded: bool,
    pub guarantor_document_uploaded: bool,
    pub logged_in: bool,

    // timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// apply one confirmed payment to the aggregates
    ///
    /// The month is appended to `paid_months` only if absent, so replaying
    /// the same reconciliation within one call cannot double count.
    pub fn record_payment(&mut self, month: u32, amount: Money, now: DateTime<Utc>) {
        self.total_months_paid += 1;
        self.total_amount_paid += amount;
        if !self.paid_months.contains(&month) {
            self.paid_months.push(month);
        }
        self.updated_at = now;
    }

    pub fn is_fully_paid(&self) -> bool {
        self.total_months_paid >= self.term_months
    }
}

/// append-only duplicate of a paid installment, captured at payment time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub month: u32,
    pub amount: Money,
    pub transaction_ref: String,
    pub paid_at: DateTime<Utc>,
    /// the due date that was current when the payment landed
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// everything owned by one account, stored and committed as a unit
///
/// Keeping the whole subtree in one versioned document makes every
/// read-modify-write a single compare-and-swap commit; no multi-key
/// atomicity is required of the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: Account,
    pub installments: Vec<Installment>,
    pub documents: Vec<DocumentBundle>,
    pub payment_history: Vec<PaymentHistoryEntry>,
    pub notifications: Vec<Notification>,
}

impl AccountRecord {
    pub fn new(account: Account, installments: Vec<Installment>) -> Self {
        Self {
            account,
            installments,
            documents: Vec::new(),
            payment_history: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn installment(&self, month: u32) -> Option<&Installment> {
        self.installments.iter().find(|i| i.month == month)
    }

    pub fn installment_mut(&mut self, month: u32) -> Option<&mut Installment> {
        self.installments.iter_mut().find(|i| i.month == month)
    }

    /// history entry for an external transaction reference, if already applied
    pub fn history_for_transaction(&self, transaction_ref: &str) -> Option<&PaymentHistoryEntry> {
        self.payment_history
            .iter()
            .find(|e| e.transaction_ref == transaction_ref)
    }

    pub fn document(&self, category: DocumentCategory) -> Option<&DocumentBundle> {
        self.documents.iter().find(|d| d.category == category)
    }

    /// attach a document bundle, rejecting a second bundle for the category
    pub fn attach_documents(&mut self, bundle: DocumentBundle, now: DateTime<Utc>) -> Result<()> {
        if self.document(bundle.category).is_some() {
            return Err(PortalError::DocumentsAlreadyUploaded {
                category: bundle.category,
            });
        }

        self.set_document_flag(bundle.category, true, now);
        self.documents.push(bundle);
        Ok(())
    }

    /// remove a category's bundle and recompute both uploaded flags
    pub fn remove_documents(
        &mut self,
        category: DocumentCategory,
        now: DateTime<Utc>,
    ) -> Result<DocumentBundle> {
        let index = self
            .documents
            .iter()
            .position(|d| d.category == category)
            .ok_or(PortalError::DocumentsNotFound { category })?;
        let removed = self.documents.remove(index);

        self.account.customer_document_uploaded =
            self.document(DocumentCategory::Customer).is_some();
        self.account.guarantor_document_uploaded =
            self.document(DocumentCategory::Guarantor).is_some();
        self.account.updated_at = now;
        Ok(removed)
    }

    fn set_document_flag(&mut self, category: DocumentCategory, value: bool, now: DateTime<Utc>) {
        match category {
            DocumentCategory::Customer => self.account.customer_document_uploaded = value,
            DocumentCategory::Guarantor => self.account.guarantor_document_uploaded = value,
        }
        self.account.updated_at = now;
    }

    pub fn post_notification(&mut self, notification: Notification) -> Uuid {
        let id = notification.id;
        self.notifications.push(notification);
        id
    }

    /// notifications still within their visibility window
    pub fn visible_notifications(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.is_visible(now))
            .collect()
    }

    /// physically remove expired notifications, returning the count removed
    pub fn sweep_notifications(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.is_visible(now));
        before - self.notifications.len()
    }

    /// explicit user dismissal
    pub fn dismiss_notification(&mut self, id: Uuid) -> Result<()> {
        let index = self
            .notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or(PortalError::NotificationNotFound { id })?;
        self.notifications.remove(index);
        Ok(())
    }
}
