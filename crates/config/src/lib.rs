//! Configuration for the ferry client.

mod config;

pub use config::{
    Config, ConfigError, LedgerConfig, LockConfig, LoggingConfig, WitnessConfig,
};
