use crate::engine::{format_currency, AccountStatusFilter, FilterQuery, PaymentSummary, StatusFilter};
use crate::models::{AccountRow, PaymentStatus};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

const NOT_AVAILABLE: &str = "N/A";

/// Query string shared by the list and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub user_status: Option<String>,
}

impl UserListParams {
    pub fn into_query(self) -> Result<FilterQuery, AppError> {
        let payment_status = match self.status.as_deref() {
            Some(status) => status
                .parse::<StatusFilter>()
                .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?,
            None => StatusFilter::All,
        };
        let account_status = match self.user_status.as_deref() {
            Some(status) if !status.is_empty() => AccountStatusFilter::parse(status),
            _ => AccountStatusFilter::All,
        };

        Ok(FilterQuery {
            search: self.search.unwrap_or_default(),
            payment_status,
            account_status,
        })
    }
}

/// One table row, display-ready.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRowView {
    pub account: String,
    pub name: String,
    pub email: String,
    pub clinic: String,
    pub status: String,
    pub amount_owed: String,
    pub payment_status: PaymentStatus,
    pub status_label: &'static str,
    pub status_class: String,
}

impl From<&AccountRow> for UserRowView {
    fn from(row: &AccountRow) -> Self {
        let record = &row.record;
        let or_na = |value: &Option<String>| {
            value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            account: record
                .acct_num
                .map(|n| n.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            name: record
                .full_name()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            email: or_na(&record.email),
            clinic: or_na(&record.clinic),
            status: or_na(&record.raw_status),
            amount_owed: format!("${}", format_currency(Some(record.amount_owed))),
            payment_status: row.payment_status,
            status_label: row.payment_status.label(),
            status_class: row.payment_status.badge_class(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    /// Counters over every account, not just the matching ones.
    pub summary: PaymentSummary,
    pub total_matching: usize,
    pub users: Vec<UserRowView>,
}
