pub mod config;
pub mod error;

pub use config::{Config, LoggingConfig, QueueConfig, ReplayConfig};
pub use error::*;
