//! Logging subsystem with OpenTelemetry support.

mod manager;
mod service;
mod types;


pub use manager::{finalize, init, LoggingError};
pub use service::{init_logging_from_config, LoggingInitConfig};
pub use tracing_appender::rolling::Rotation;
pub use types::{FileLoggingConfig, LoggerConfig, OtlpExportConfig, ResourceConfig, StdoutConfig};

/// Formats a service name with an optional label suffix.
pub fn format_service_name(base: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
