pub mod logging;

pub use logging::{init_cli_logging, init_tracing};
