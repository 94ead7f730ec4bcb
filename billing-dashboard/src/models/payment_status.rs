//! Derived payment status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Payment status derived from an account's balances and bill date.
///
/// Never persisted; recomputed every time records are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment status: {0}")]
pub struct UnknownPaymentStatus(pub String);

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Paid,
        PaymentStatus::Pending,
        PaymentStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
        }
    }

    /// Capitalized text shown on the status badge.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Overdue => "Overdue",
        }
    }

    /// CSS class used by the dashboard table.
    pub fn badge_class(&self) -> String {
        format!("status-{}", self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            "overdue" => Ok(PaymentStatus::Overdue),
            _ => Err(UnknownPaymentStatus(s.to_string())),
        }
    }
}
