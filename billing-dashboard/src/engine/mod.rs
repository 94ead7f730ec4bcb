//! Payment classification, filtering, aggregation and export.
//!
//! Everything here is synchronous and pure over an in-memory slice of
//! already-loaded rows; the async store lives in [`crate::services`].

mod classify;
mod csv_export;
mod currency;
mod dashboard;
mod filter;
mod summary;

pub use classify::{classify, days_since, PaymentClassifier, DEFAULT_OVERDUE_AFTER_DAYS};
pub use csv_export::{export_filename, to_csv, ExportError, CSV_HEADERS};
pub use currency::{format_currency, format_currency_str};
pub use dashboard::{reduce, Dashboard, DashboardEvent, DashboardSink, DashboardState};
pub use filter::{filter, matches, AccountStatusFilter, FilterQuery, StatusFilter};
pub use summary::{summarize, PaymentSummary};
