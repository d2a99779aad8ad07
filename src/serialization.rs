/// serialization support for account state
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountRecord, PaymentHistoryEntry};
use crate::decimal::Money;
use crate::types::{AccountId, InstallmentStatus};

/// serializable view of an account's state
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountView {
    pub uid: AccountId,
    pub customer_id: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub loan: LoanView,
    pub documents: DocumentFlagsView,
    pub schedule: Vec<InstallmentView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_type: char,
    pub principal: Money,
    pub monthly_emi: Option<Money>,
    pub term_months: u32,
    pub position: u32,
    pub total_months_paid: u32,
    pub total_amount_paid: Money,
    pub remaining_months: u32,
    pub next_due_date: Option<DateTime<Utc>>,
    pub fully_paid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentFlagsView {
    pub customer_uploaded: bool,
    pub guarantor_uploaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstallmentView {
    pub month: u32,
    pub amount: Money,
    pub status: InstallmentStatus,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl AccountView {
    pub fn from_record(record: &AccountRecord) -> Self {
        let account = &record.account;
        AccountView {
            uid: account.uid,
            customer_id: account.customer_id.clone(),
            full_name: format!("{} {}", account.first_name, account.last_name),
            email: account.email.clone(),
            mobile: account.mobile.clone(),
            loan: LoanView {
                loan_type: account.loan_type,
                principal: account.principal,
                monthly_emi: record.installments.first().map(|i| i.amount),
                term_months: account.term_months,
                position: account.position,
                total_months_paid: account.total_months_paid,
                total_amount_paid: account.total_amount_paid,
                remaining_months: account.term_months.saturating_sub(account.total_months_paid),
                next_due_date: account.next_due_date,
                fully_paid: account.is_fully_paid(),
            },
            documents: DocumentFlagsView {
                customer_uploaded: account.customer_document_uploaded,
                guarantor_uploaded: account.guarantor_document_uploaded,
            },
            schedule: record
                .installments
                .iter()
                .map(|i| InstallmentView {
                    month: i.month,
                    amount: i.amount,
                    status: i.status,
                    due_date: i.due_date,
                    paid_at: i.paid_at,
                })
                .collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// one printable receipt line per recorded payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub date: DateTime<Utc>,
    pub month_label: String,
    pub amount: Money,
    pub transaction_id: String,
}

impl ReceiptLine {
    pub fn from_entry(entry: &PaymentHistoryEntry) -> Self {
        ReceiptLine {
            date: entry.paid_at,
            month_label: format!("Month {}", entry.month),
            amount: entry.amount,
            transaction_id: entry.transaction_ref.clone(),
        }
    }
}

/// receipt lines for an account, oldest first
pub fn receipt_lines(record: &AccountRecord) -> Vec<ReceiptLine> {
    record
        .payment_history
        .iter()
        .map(ReceiptLine::from_entry)
        .collect()
}
