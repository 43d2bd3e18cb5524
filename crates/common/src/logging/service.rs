//! Logging setup shared by the ferry binaries.

use std::path::Path;

use tracing::info;

use super::{format_service_name, init, FileLoggingConfig, LoggerConfig, LoggingError};

/// Inputs for [`init_logging_from_config`].
#[derive(Debug)]
pub struct LoggingInitConfig<'a> {
    pub service_base_name: &'a str,
    /// Optional suffix such as `prod` or `dev`.
    pub service_label: Option<&'a str>,
    pub service_instance_id: Option<String>,
    pub otlp_url: Option<&'a str>,
    pub log_dir: Option<&'a Path>,
    pub json_format: bool,
}

/// Builds a [`LoggerConfig`] from process settings and installs it.
pub fn init_logging_from_config(config: LoggingInitConfig<'_>) -> Result<(), LoggingError> {
    let lconfig = build_logger_config(&config);
    let file_logging = lconfig.file_logging_config.clone();

    init(lconfig)?;

    if let Some(url) = config.otlp_url {
        info!(%url, "using OpenTelemetry tracing output");
    }
    if let Some(file_config) = file_logging {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
    Ok(())
}

pub(super) fn build_logger_config(config: &LoggingInitConfig<'_>) -> LoggerConfig {
    let service_name = format_service_name(config.service_base_name, config.service_label);
    let mut lconfig = LoggerConfig::new(service_name).with_json_logging(config.json_format);

    if let Some(url) = config.otlp_url {
        lconfig.set_otlp_url(url.to_string());
    }
    if let Some(id) = &config.service_instance_id {
        lconfig = lconfig.with_service_instance_id(id.clone());
    }
    if let Some(dir) = config.log_dir {
        let file = FileLoggingConfig::new(dir.to_path_buf(), config.service_base_name.to_owned())
            .with_json_format(config.json_format);
        lconfig = lconfig.with_file_logging(file);
    }
    lconfig
}
