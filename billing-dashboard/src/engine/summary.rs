use crate::models::{AccountRow, PaymentStatus};
use serde::Serialize;
use std::borrow::Borrow;

/// The four counters shown above the dashboard table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub total: usize,
    pub paid: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl PaymentSummary {
    /// Every row has exactly one status, so the counts always add up.
    pub fn reconciles(&self) -> bool {
        self.paid + self.pending + self.overdue == self.total
    }

    pub fn count(&self, status: PaymentStatus) -> usize {
        match status {
            PaymentStatus::Paid => self.paid,
            PaymentStatus::Pending => self.pending,
            PaymentStatus::Overdue => self.overdue,
        }
    }
}

/// Count rows by derived status. Callers pass the full, unfiltered set.
pub fn summarize<I, R>(rows: I) -> PaymentSummary
where
    I: IntoIterator<Item = R>,
    R: Borrow<AccountRow>,
{
    rows.into_iter()
        .fold(PaymentSummary::default(), |mut summary, row| {
            summary.total += 1;
            match row.borrow().payment_status {
                PaymentStatus::Paid => summary.paid += 1,
                PaymentStatus::Pending => summary.pending += 1,
                PaymentStatus::Overdue => summary.overdue += 1,
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PaymentClassifier;
    use crate::models::UserBillingRecord;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_set() {
        let summary = summarize(Vec::<AccountRow>::new());
        assert_eq!(summary, PaymentSummary::default());
        assert!(summary.reconciles());
    }

    #[test]
    fn test_counts_reconcile_over_mixed_records() {
        let now = Utc::now();
        let mut records = Vec::new();
        for i in 0..40_i64 {
            records.push(UserBillingRecord {
                acct_num: Some(i),
                amount_owed: Decimal::from(i % 4),
                maintenance_billed: Decimal::from(100),
                maintenance_paid: Decimal::from(if i % 3 == 0 { 100 } else { 0 }),
                bill_date: (i % 5 != 0).then(|| now - Duration::days(i * 2)),
                ..Default::default()
            });
        }
        records.push(UserBillingRecord::default());

        let rows = PaymentClassifier::default().annotate(records, now);
        let summary = summarize(&rows);

        assert_eq!(summary.total, 41);
        assert!(summary.reconciles());
        for status in PaymentStatus::ALL {
            let expected = rows.iter().filter(|r| r.payment_status == status).count();
            assert_eq!(summary.count(status), expected);
        }
    }
}
