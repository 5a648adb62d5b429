//! Process-level plumbing shared by the server binary: layered configuration
//! and logging setup.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs};
pub use logging::init_logging_from_config;
