use std::{fs, io, path::{Path, PathBuf}, time::Duration};

use ferry_common::RetryConfig;
use ferry_ledger::RuntimeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default value for `poll_interval_ms` in [`LedgerConfig`].
const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Default value for `request_timeout_ms` in [`LedgerConfig`].
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default gas limit for witness transactions.
const DEFAULT_FEE_GAS: u64 = 1_000;

/// Default time the lock flow waits for a quorum.
const DEFAULT_DEADLINE_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Connection to the ledger node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the node.
    pub rpc_url: String,

    /// Runtime whose ledger to use, as 32 bytes of hex.
    pub runtime_id: RuntimeId,

    /// How often to poll for new rounds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bound on a single RPC round trip.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl LedgerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WitnessConfig {
    /// File holding the hex encoded 32 byte signing seed.
    pub key_path: PathBuf,

    /// Where witnessed locks and the processed round are persisted.
    pub checkpoint_path: PathBuf,

    /// Native token fee offered per witness transaction.
    #[serde(default)]
    pub fee_amount: u64,

    #[serde(default = "default_fee_gas")]
    pub fee_gas: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// File holding the hex encoded 32 byte signing seed.
    pub key_path: PathBuf,

    /// How long to wait for the quorum after the lock executes.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    #[serde(default)]
    pub fee_amount: u64,

    #[serde(default = "default_fee_gas")]
    pub fee_gas: u64,
}

impl LockConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Suffix appended to the service name, e.g. "prod".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub otlp_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,

    /// Required to run the witness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<WitnessConfig>,

    /// Required to run the lock flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_fee_gas() -> u64 {
    DEFAULT_FEE_GAS
}

fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    const RUNTIME_ID: &str = "8000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_config_load_full() {
        let config_string = format!(
            r#"
            [ledger]
            rpc_url = "http://localhost:8545"
            runtime_id = "{RUNTIME_ID}"
            poll_interval_ms = 250

            [witness]
            key_path = "/keys/witness.hex"
            checkpoint_path = "/data/witness.json"
            fee_gas = 2000

            [witness.retry]
            max_retries = 7

            [lock]
            key_path = "/keys/user.hex"
            deadline_secs = 60

            [logging]
            service_label = "dev"
            json_format = true
        "#
        );

        let config = Config::from_toml_str(&config_string);
        assert!(
            config.is_ok(),
            "should be able to load TOML config but got: {:?}",
            config.err()
        );
        let config = config.unwrap();

        assert_eq!(config.ledger.poll_interval(), Duration::from_millis(250));
        assert_eq!(
            config.ledger.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS,
            "request timeout should fall back to its default"
        );

        let witness = config.witness.unwrap();
        assert_eq!(witness.fee_amount, 0);
        assert_eq!(witness.fee_gas, 2000);
        assert_eq!(witness.retry.max_retries, 7);
        assert_eq!(witness.retry.base_delay_ms, RetryConfig::default().base_delay_ms);

        let lock = config.lock.unwrap();
        assert_eq!(lock.deadline(), Duration::from_secs(60));
        assert_eq!(lock.fee_gas, DEFAULT_FEE_GAS);

        assert_eq!(config.logging.service_label.as_deref(), Some("dev"));
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_config_minimal() {
        let config_string = format!(
            r#"
            [ledger]
            rpc_url = "http://localhost:8545"
            runtime_id = "{RUNTIME_ID}"
        "#
        );

        let config = Config::from_toml_str(&config_string).unwrap();
        assert!(config.witness.is_none());
        assert!(config.lock.is_none());
        assert_eq!(config.ledger.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_config_missing_required_fields() {
        let no_runtime = r#"
            [ledger]
            rpc_url = "http://localhost:8545"
        "#;
        assert!(matches!(
            Config::from_toml_str(no_runtime),
            Err(ConfigError::Parse(_))
        ));

        let bad_runtime = r#"
            [ledger]
            rpc_url = "http://localhost:8545"
            runtime_id = "abcd"
        "#;
        assert!(Config::from_toml_str(bad_runtime).is_err());

        assert!(Config::from_toml_str("").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[ledger]\nrpc_url = \"http://node:1\"\nruntime_id = \"{RUNTIME_ID}\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.ledger.rpc_url, "http://node:1");

        assert!(matches!(
            Config::from_file(Path::new("/nonexistent/ferry.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
