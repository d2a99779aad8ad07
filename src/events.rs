use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{AccountId, DocumentCategory};

/// all events emitted by portal operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    AccountRegistered {
        uid: AccountId,
        customer_id: String,
        position: u32,
        principal: Money,
        term_months: u32,
        timestamp: DateTime<Utc>,
    },
    CustomerIdCollisionResolved {
        uid: AccountId,
        base: String,
        assigned: String,
        timestamp: DateTime<Utc>,
    },

    // session events
    SessionOpened {
        uid: AccountId,
        timestamp: DateTime<Utc>,
    },
    SessionClosed {
        uid: AccountId,
        timestamp: DateTime<Utc>,
    },
    PasswordChanged {
        uid: AccountId,
        timestamp: DateTime<Utc>,
    },

    // payment events
    InstallmentPaid {
        uid: AccountId,
        month: u32,
        amount: Money,
        transaction_ref: String,
        next_due_date: Option<DateTime<Utc>>,
        timestamp: DateTime<Utc>,
    },
    PaymentReplayed {
        uid: AccountId,
        month: u32,
        transaction_ref: String,
        timestamp: DateTime<Utc>,
    },
    LoanSettled {
        uid: AccountId,
        total_amount_paid: Money,
        timestamp: DateTime<Utc>,
    },

    // document events
    DocumentsUploaded {
        uid: AccountId,
        category: DocumentCategory,
        file_count: usize,
        timestamp: DateTime<Utc>,
    },
    DocumentsRemoved {
        uid: AccountId,
        category: DocumentCategory,
        timestamp: DateTime<Utc>,
    },

    // notification events
    NotificationPosted {
        uid: AccountId,
        notification_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },
    NotificationDismissed {
        uid: AccountId,
        notification_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    NotificationsSwept {
        uid: AccountId,
        removed: usize,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
