pub mod health;
pub mod users;

pub use health::{health_check, metrics_handler, readiness_check};
pub use users::{export_users, generate_bill, list_users, users_summary};
