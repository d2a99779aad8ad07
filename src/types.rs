use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for an account
pub type AccountId = Uuid;

/// installment status
///
/// At most one installment per account is `Pending` at a time; everything
/// after it is `Upcoming`, everything before it `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    /// currently due
    Pending,
    /// scheduled for a future month
    Upcoming,
    /// settled by a confirmed payment
    Paid,
}

/// document bundle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentCategory {
    Customer,
    Guarantor,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Customer => "customer",
            DocumentCategory::Guarantor => "guarantor",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
