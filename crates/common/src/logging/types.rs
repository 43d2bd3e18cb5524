//! Configuration types for the logging subsystem.

use std::{path::PathBuf, time::Duration};

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

/// Stdout layer settings.
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    pub json_format: bool,
    /// Span events to log.
    pub fmt_span: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            fmt_span: FmtSpan::NONE,
        }
    }
}

/// Rolling file logging settings.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    /// File name prefix, e.g. "ferry-witness" gives "ferry-witness.2026-01-01".
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub json_format: bool,
}

impl FileLoggingConfig {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            json_format: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }
}

/// OTLP exporter timeout.
#[derive(Debug, Clone)]
pub struct OtlpExportConfig {
    pub timeout: Duration,
}

impl Default for OtlpExportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// Resource attributes following OpenTelemetry semantic conventions.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    pub service_instance_id: Option<String>,
    pub custom_attributes: Vec<KeyValue>,
}

impl ResourceConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            service_version: None,
            service_instance_id: None,
            custom_attributes: Vec::new(),
        }
    }

    pub fn build_resource(&self) -> Resource {
        let ResourceConfig {
            service_name,
            service_version,
            service_instance_id,
            custom_attributes,
        } = self;

        let mut attributes = vec![KeyValue::new("service.name", service_name.clone())];

        if let Some(version) = service_version {
            attributes.push(KeyValue::new("service.version", version.clone()));
        }

        if let Some(instance_id) = service_instance_id {
            attributes.push(KeyValue::new("service.instance.id", instance_id.clone()));
        }

        attributes.extend(custom_attributes.iter().cloned());

        Resource::new(attributes)
    }
}

/// Top level logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub resource: ResourceConfig,
    pub otel_url: Option<String>,
    pub stdout_config: StdoutConfig,
    pub file_logging_config: Option<FileLoggingConfig>,
    pub otlp_export_config: OtlpExportConfig,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            resource: ResourceConfig::new(service_name),
            otel_url: None,
            stdout_config: StdoutConfig::default(),
            file_logging_config: None,
            otlp_export_config: OtlpExportConfig::default(),
        }
    }

    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }

    pub fn with_service_version(mut self, version: String) -> Self {
        self.resource.service_version = Some(version);
        self
    }

    /// Tags every exported span with the instance, e.g. a witness address.
    pub fn with_service_instance_id(mut self, instance_id: String) -> Self {
        self.resource.service_instance_id = Some(instance_id);
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.stdout_config.json_format = enabled;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file_logging_config = Some(config);
        self
    }

    pub fn with_fmt_span(mut self, fmt_span: FmtSpan) -> Self {
        self.stdout_config.fmt_span = fmt_span;
        self
    }

    pub fn with_otlp_export_config(mut self, config: OtlpExportConfig) -> Self {
        self.otlp_export_config = config;
        self
    }

    pub fn add_resource_attribute(mut self, key: &str, value: String) -> Self {
        self.resource
            .custom_attributes
            .push(KeyValue::new(key.to_string(), value));
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new("ferry".to_string())
    }
}
