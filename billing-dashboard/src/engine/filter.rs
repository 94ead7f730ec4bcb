use crate::models::{AccountRow, PaymentStatus, UnknownPaymentStatus};
use std::borrow::Borrow;
use std::str::FromStr;

/// Derived payment status filter; `"all"` disables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PaymentStatus),
}

impl FromStr for StatusFilter {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Raw account status filter; `"all"` disables it, anything else must match
/// the stored status exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountStatusFilter {
    #[default]
    All,
    Only(String),
}

impl AccountStatusFilter {
    pub fn parse(value: &str) -> Self {
        if value == "all" {
            AccountStatusFilter::All
        } else {
            AccountStatusFilter::Only(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub search: String,
    pub payment_status: StatusFilter,
    pub account_status: AccountStatusFilter,
}

impl FilterQuery {
    pub fn is_identity(&self) -> bool {
        self.search.trim().is_empty()
            && self.payment_status == StatusFilter::All
            && self.account_status == AccountStatusFilter::All
    }
}

fn search_text(row: &AccountRow) -> String {
    let record = &row.record;
    [
        record.first_name.as_deref().unwrap_or(""),
        record.last_name.as_deref().unwrap_or(""),
        record.email.as_deref().unwrap_or(""),
        &record.acct_num_text(),
        record.clinic.as_deref().unwrap_or(""),
    ]
    .join(" ")
    .to_lowercase()
}

/// `true` when `row` passes all three predicates of `query`.
pub fn matches(row: &AccountRow, query: &FilterQuery) -> bool {
    let term = query.search.trim().to_lowercase();
    if !term.is_empty() && !search_text(row).contains(&term) {
        return false;
    }

    if let StatusFilter::Only(status) = query.payment_status {
        if row.payment_status != status {
            return false;
        }
    }

    if let AccountStatusFilter::Only(status) = &query.account_status {
        if row.record.raw_status_text() != status {
            return false;
        }
    }

    true
}

/// Stable filter: matching rows in their original order.
pub fn filter<'a, R>(rows: &'a [R], query: &FilterQuery) -> Vec<&'a AccountRow>
where
    R: Borrow<AccountRow>,
{
    rows.iter()
        .map(<R as Borrow<AccountRow>>::borrow)
        .filter(|row| matches(row, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserBillingRecord;

    fn row(acct: i64, first: &str, last: &str, status: PaymentStatus, raw: &str) -> AccountRow {
        AccountRow {
            record: UserBillingRecord {
                acct_num: Some(acct),
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                email: Some(format!("{}@example.com", first.to_lowercase())),
                clinic: Some("Spine Center".to_string()),
                raw_status: Some(raw.to_string()),
                ..Default::default()
            },
            payment_status: status,
        }
    }

    fn rows() -> Vec<AccountRow> {
        vec![
            row(1, "Jane", "Doe", PaymentStatus::Paid, "A"),
            row(2, "Tom", "Smith", PaymentStatus::Overdue, "A"),
            row(3, "Ann", "Lee", PaymentStatus::Pending, "I"),
            row(12, "Bob", "Stone", PaymentStatus::Overdue, "I"),
        ]
    }

    fn accounts(result: &[&AccountRow]) -> Vec<i64> {
        result.iter().filter_map(|r| r.record.acct_num).collect()
    }

    #[test]
    fn test_default_query_is_identity() {
        let rows = rows();
        let query = FilterQuery::default();
        assert!(query.is_identity());
        let result = filter(&rows, &query);
        assert_eq!(result.len(), rows.len());
        assert!(result.iter().zip(rows.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let rows = rows();
        let query = FilterQuery {
            search: "  SMITH ".to_string(),
            ..Default::default()
        };
        assert_eq!(accounts(&filter(&rows, &query)), vec![2]);

        let query = FilterQuery {
            search: "spine".to_string(),
            ..Default::default()
        };
        assert_eq!(filter(&rows, &query).len(), 4);
    }

    #[test]
    fn test_search_matches_account_number_text() {
        let rows = rows();
        let query = FilterQuery {
            search: "1".to_string(),
            ..Default::default()
        };
        assert_eq!(accounts(&filter(&rows, &query)), vec![1, 12]);
    }

    #[test]
    fn test_search_spans_joined_fields() {
        let rows = rows();
        let query = FilterQuery {
            search: "jane doe".to_string(),
            ..Default::default()
        };
        assert_eq!(accounts(&filter(&rows, &query)), vec![1]);
    }

    #[test]
    fn test_status_filters_are_anded() {
        let rows = rows();
        let query = FilterQuery {
            payment_status: StatusFilter::Only(PaymentStatus::Overdue),
            account_status: AccountStatusFilter::Only("I".to_string()),
            ..Default::default()
        };
        assert_eq!(accounts(&filter(&rows, &query)), vec![12]);
    }

    #[test]
    fn test_account_status_matches_missing_as_empty() {
        let mut rows = rows();
        rows[0].record.raw_status = None;
        let query = FilterQuery {
            account_status: AccountStatusFilter::Only(String::new()),
            ..Default::default()
        };
        assert_eq!(accounts(&filter(&rows, &query)), vec![1]);
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "overdue".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(PaymentStatus::Overdue)
        );
        assert!("late".parse::<StatusFilter>().is_err());
        assert_eq!(AccountStatusFilter::parse("all"), AccountStatusFilter::All);
        assert_eq!(
            AccountStatusFilter::parse("A"),
            AccountStatusFilter::Only("A".to_string())
        );
    }
}
