pub mod database;
pub mod metrics;
pub mod store;

pub use database::MongoDb;
pub use self::metrics::{get_metrics, init_metrics};
pub use store::{load_account_rows, InMemoryUserStore, UserStore, LOAD_FAILED_MESSAGE};
