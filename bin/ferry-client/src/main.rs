//! Ferry bridge client.
//!
//! `witness` attests locks on behalf of one witness key. `lock` locks funds for one user
//! and prints the quorum proof.

mod args;
mod helpers;
mod lock;
mod witness;

use anyhow::Context;
use args::{Args, Command, EnvArgs};
use ferry_common::logging::{self, LoggingInitConfig};
use ferry_config::Config;
use ferry_rpc_api::RpcLedgerClient;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e:#}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_file(&args.config)?;
    if let Some(url) = args.rpc_url {
        config.ledger.rpc_url = url;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("ferry-rt")
        .build()
        .context("init: build runtime")?;

    // The OTLP exporter needs a runtime context.
    {
        let _g = runtime.enter();
        init_logging(&config, EnvArgs::from_env())?;
    }

    let res = runtime.block_on(run(config, args.command));
    logging::finalize();
    res
}

async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    let ledger = RpcLedgerClient::try_new(
        &config.ledger.rpc_url,
        config.ledger.runtime_id,
        config.ledger.poll_interval(),
        config.ledger.request_timeout(),
    )?;
    info!(url = %config.ledger.rpc_url, runtime_id = %config.ledger.runtime_id, "using ledger");

    match command {
        Command::Witness(cmd) => witness::run(&config, ledger, cmd).await,
        Command::Lock(cmd) => lock::run(&config, ledger, cmd).await,
    }
}

fn init_logging(config: &Config, env_args: EnvArgs) -> anyhow::Result<()> {
    let logging = &config.logging;
    let service_label = env_args.service_label.or_else(|| logging.service_label.clone());
    let otlp_url = env_args.otlp_url.or_else(|| logging.otlp_url.clone());
    let log_dir = env_args.log_dir.or_else(|| logging.log_dir.clone());

    logging::init_logging_from_config(LoggingInitConfig {
        service_base_name: "ferry-client",
        service_label: service_label.as_deref(),
        service_instance_id: None,
        otlp_url: otlp_url.as_deref(),
        log_dir: log_dir.as_deref(),
        json_format: logging.json_format,
    })?;
    Ok(())
}
