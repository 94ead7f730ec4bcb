//! Domain models for billing-dashboard.

pub mod coerce;
mod normalize;
mod payment_status;
mod record;

pub use normalize::normalize_documents;
pub use payment_status::{PaymentStatus, UnknownPaymentStatus};
pub use record::{fields, AccountRow, UserBillingRecord};
