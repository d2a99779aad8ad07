use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::{AccountRecord, PaymentHistoryEntry};
use crate::decimal::Money;
use crate::errors::{PortalError, Result};
use crate::events::{Event, EventStore};
use crate::types::InstallmentStatus;

/// outcome of a reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub month: u32,
    pub amount: Money,
    pub transaction_ref: String,
    pub paid_at: DateTime<Utc>,
    pub next_due_date: Option<DateTime<Utc>>,
    /// true when the transaction reference had already been applied and the
    /// call changed nothing
    pub replayed: bool,
}

/// transition one installment to `Paid` and update the dependent aggregates
///
/// Applied in memory against a loaded record; the caller commits the whole
/// record in one conditional write, so the transition is all-or-nothing.
///
/// Idempotent under at-least-once delivery: a transaction reference already
/// present in payment history returns the original receipt without touching
/// the record. A paid installment hit with a different reference is a
/// conflict, never a second application.
pub fn apply_payment(
    record: &mut AccountRecord,
    month: u32,
    amount: Money,
    transaction_ref: &str,
    now: DateTime<Utc>,
    events: &mut EventStore,
) -> Result<PaymentReceipt> {
    if !amount.is_positive() {
        return Err(PortalError::InvalidPaymentAmount { amount });
    }
    if transaction_ref.is_empty() {
        return Err(PortalError::MissingField {
            field: "transaction_ref",
        });
    }

    let uid = record.account.uid;

    // replayed delivery of an already-applied payment
    if let Some(entry) = record.history_for_transaction(transaction_ref) {
        debug!(%uid, month, transaction_ref, "payment replay ignored");
        let receipt = PaymentReceipt {
            month: entry.month,
            amount: entry.amount,
            transaction_ref: entry.transaction_ref.clone(),
            paid_at: entry.paid_at,
            next_due_date: record.account.next_due_date,
            replayed: true,
        };
        events.emit(Event::PaymentReplayed {
            uid,
            month: entry.month,
            transaction_ref: entry.transaction_ref.clone(),
            timestamp: now,
        });
        return Ok(receipt);
    }

    let installment = record
        .installment_mut(month)
        .ok_or(PortalError::MissingDueDate { month })?;

    if installment.status == InstallmentStatus::Paid {
        return Err(PortalError::InstallmentAlreadyPaid { month });
    }

    // the due date that was current when the payment landed, kept for history
    let due_at_payment = installment.due_date;

    installment.status = InstallmentStatus::Paid;
    installment.paid_at = Some(now);
    installment.transaction_ref = Some(transaction_ref.to_string());

    // promote the following installment and advance the account's due pointer
    let next_due_date = match record.installment_mut(month + 1) {
        Some(next) => {
            if next.status == InstallmentStatus::Upcoming {
                next.status = InstallmentStatus::Pending;
            }
            Some(next.due_date)
        }
        None => None,
    };

    record.account.record_payment(month, amount, now);
    record.account.next_due_date = next_due_date;

    record.payment_history.push(PaymentHistoryEntry {
        month,
        amount,
        transaction_ref: transaction_ref.to_string(),
        paid_at: now,
        due_date: due_at_payment,
        created_at: now,
    });

    events.emit(Event::InstallmentPaid {
        uid,
        month,
        amount,
        transaction_ref: transaction_ref.to_string(),
        next_due_date,
        timestamp: now,
    });

    if record.account.is_fully_paid() {
        events.emit(Event::LoanSettled {
            uid,
            total_amount_paid: record.account.total_amount_paid,
            timestamp: now,
        });
    }

    Ok(PaymentReceipt {
        month,
        amount,
        transaction_ref: transaction_ref.to_string(),
        paid_at: now,
        next_due_date,
        replayed: false,
    })
}
