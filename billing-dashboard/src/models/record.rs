//! Account billing record.

use super::PaymentStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Field names as persisted in the `handyworks_users` collection.
pub mod fields {
    pub const ACCT_NUM: &str = "acct_num";
    pub const FIRST_NAME: &str = "fname";
    pub const LAST_NAME: &str = "lname";
    pub const EMAIL: &str = "EMAIL";
    pub const CLINIC: &str = "clinic";
    pub const STATUS: &str = "status";
    pub const MAINT_BILLED: &str = "maint_billed";
    pub const MAINT_PAID: &str = "maint_paid";
    pub const OWED: &str = "owed";
    pub const MAINT_BILL_DATE: &str = "maintbilldt";
    pub const MAINT_PAID_DATE: &str = "maintpddt";
    pub const IMPORTED_AT: &str = "imported_at";
    pub const SOURCE: &str = "source";
}

/// One customer account as seen by the dashboard.
///
/// Produced only by the ingestion normalizer, so every numeric field is
/// already defaulted and every text field is either absent or non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserBillingRecord {
    pub acct_num: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub clinic: Option<String>,
    /// Externally assigned account status (e.g. "A"); opaque here.
    pub raw_status: Option<String>,
    pub amount_owed: Decimal,
    pub maintenance_billed: Decimal,
    pub maintenance_paid: Decimal,
    pub bill_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
}

impl UserBillingRecord {
    /// `"first last"`, trimmed; `None` when both parts are missing.
    pub fn full_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    pub fn acct_num_text(&self) -> String {
        self.acct_num.map(|n| n.to_string()).unwrap_or_default()
    }

    pub fn raw_status_text(&self) -> &str {
        self.raw_status.as_deref().unwrap_or("")
    }
}

/// A record paired with its derived payment status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRow {
    #[serde(flatten)]
    pub record: UserBillingRecord,
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_trims_missing_parts() {
        let record = UserBillingRecord {
            first_name: Some("Jane".into()),
            ..Default::default()
        };
        assert_eq!(record.full_name().as_deref(), Some("Jane"));

        let record = UserBillingRecord {
            last_name: Some("Doe".into()),
            ..Default::default()
        };
        assert_eq!(record.full_name().as_deref(), Some("Doe"));

        assert_eq!(UserBillingRecord::default().full_name(), None);
    }

    #[test]
    fn test_acct_num_text() {
        let record = UserBillingRecord {
            acct_num: Some(1042),
            ..Default::default()
        };
        assert_eq!(record.acct_num_text(), "1042");
        assert_eq!(UserBillingRecord::default().acct_num_text(), "");
    }
}
