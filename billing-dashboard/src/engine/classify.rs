use crate::models::{AccountRow, PaymentStatus, UserBillingRecord};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Days after the maintenance bill date before an unpaid balance is overdue.
pub const DEFAULT_OVERDUE_AFTER_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days between `bill_date` and `now`, floored.
pub fn days_since(bill_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - bill_date)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentClassifier {
    overdue_after_days: i64,
}

impl Default for PaymentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_OVERDUE_AFTER_DAYS)
    }
}

impl PaymentClassifier {
    pub fn new(overdue_after_days: i64) -> Self {
        Self { overdue_after_days }
    }

    pub fn overdue_after_days(&self) -> i64 {
        self.overdue_after_days
    }

    /// Derive the payment status of one account at `now`.
    ///
    /// A zero balance with maintenance paid in full is `Paid`. A positive
    /// balance is `Overdue` once more than `overdue_after_days` whole days
    /// have passed since the bill date, otherwise `Pending`; without a bill
    /// date its age is unknown and it stays `Pending`. A zero balance with
    /// maintenance still short of the billed total is also `Pending`.
    pub fn classify(&self, record: &UserBillingRecord, now: DateTime<Utc>) -> PaymentStatus {
        let owed = record.amount_owed;

        if owed <= Decimal::ZERO && record.maintenance_paid >= record.maintenance_billed {
            return PaymentStatus::Paid;
        }

        if owed > Decimal::ZERO {
            if let Some(bill_date) = record.bill_date {
                if days_since(bill_date, now) > self.overdue_after_days {
                    return PaymentStatus::Overdue;
                }
            }
        }

        PaymentStatus::Pending
    }

    /// Attach a freshly derived status to every record, keeping order.
    pub fn annotate(&self, records: Vec<UserBillingRecord>, now: DateTime<Utc>) -> Vec<AccountRow> {
        records
            .into_iter()
            .map(|record| {
                let payment_status = self.classify(&record, now);
                AccountRow {
                    record,
                    payment_status,
                }
            })
            .collect()
    }
}

/// [`PaymentClassifier::classify`] with the default 30-day threshold.
pub fn classify(record: &UserBillingRecord, now: DateTime<Utc>) -> PaymentStatus {
    PaymentClassifier::default().classify(record, now)
}
