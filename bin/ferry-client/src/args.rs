use std::{env, path::PathBuf};

use argh::FromArgs;
use ferry_primitives::Quantity;

/// Settings overridable by environment.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnvArgs {
    /// OpenTelemetry OTLP endpoint URL
    pub otlp_url: Option<String>,
    /// Service label to include in service name
    pub service_label: Option<String>,
    /// Directory for rolling log files
    pub log_dir: Option<PathBuf>,
}

impl EnvArgs {
    pub(crate) fn from_env() -> Self {
        Self {
            otlp_url: env::var("FERRY_OTLP_URL").ok(),
            service_label: env::var("FERRY_SVC_LABEL").ok(),
            log_dir: env::var("FERRY_LOG_DIR").ok().map(PathBuf::from),
        }
    }
}

#[derive(Debug, FromArgs)]
#[argh(description = "Ferry bridge client")]
pub(crate) struct Args {
    #[argh(option, short = 'c', description = "path to the TOML config file")]
    pub config: PathBuf,

    #[argh(option, description = "ledger JSON-RPC URL, overrides the config")]
    pub rpc_url: Option<String>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
pub(crate) enum Command {
    Witness(WitnessArgs),
    Lock(LockArgs),
}

/// Runs a witness coordinator until interrupted.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "witness")]
pub(crate) struct WitnessArgs {
    #[argh(option, short = 'k', description = "path to the witness key, overrides the config")]
    pub key: Option<PathBuf>,

    #[argh(switch, description = "attest previously rejected locks again before watching")]
    pub retry_rejected: bool,
}

/// Locks funds and waits for the witness quorum.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "lock")]
pub(crate) struct LockArgs {
    #[argh(option, short = 'a', description = "amount in base units")]
    pub amount: Quantity,

    #[argh(option, short = 'd', description = "denomination, native if omitted")]
    pub denomination: Option<String>,

    #[argh(option, description = "seconds to wait for the quorum, overrides the config")]
    pub deadline_secs: Option<u64>,
}
