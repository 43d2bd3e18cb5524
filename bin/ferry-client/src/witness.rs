use std::sync::Arc;

use anyhow::Context;
use ferry_common::ShutdownSignal;
use ferry_config::Config;
use ferry_primitives::BaseUnits;
use ferry_rpc_api::RpcLedgerClient;
use ferry_tx_types::Fee;
use ferry_witness::{CoordinatorConfig, FileWitnessStore, WitnessCoordinator, WitnessStore};
use tracing::*;

use crate::{args::WitnessArgs, helpers::load_signer};

pub(crate) async fn run(
    config: &Config,
    ledger: RpcLedgerClient,
    args: WitnessArgs,
) -> anyhow::Result<()> {
    let wconfig = config
        .witness
        .as_ref()
        .context("config: missing [witness] section")?;

    let key_path = args.key.as_deref().unwrap_or(&wconfig.key_path);
    let signer = load_signer(key_path)?;
    let store = FileWitnessStore::open(&wconfig.checkpoint_path)?;
    info!(
        store = %store.path().display(),
        checkpoint = store.checkpoint(),
        rejected = store.rejected().len(),
        "loaded witness store"
    );

    let coord_config = CoordinatorConfig {
        fee: Fee::new(BaseUnits::native(wconfig.fee_amount), wconfig.fee_gas),
        retry: wconfig.retry.clone(),
    };
    let mut coordinator =
        WitnessCoordinator::new(Arc::new(ledger), store, Arc::new(signer), coord_config);
    info!(identity = %coordinator.identity(), "starting witness");

    if args.retry_rejected {
        for summary in coordinator.retry_rejected().await? {
            info!(
                round = summary.round,
                witnessed = summary.witnessed,
                rejected = summary.rejected,
                "retried rejected locks"
            );
        }
    } else if !coordinator.store().rejected().is_empty() {
        warn!(
            count = coordinator.store().rejected().len(),
            "store holds rejected locks, rerun with --retry-rejected to attest them again"
        );
    }

    let signal = ShutdownSignal::new();
    let guard = signal.guard();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
            return;
        }
        info!("interrupted, finishing current round");
        signal.send();
    });

    coordinator.run(guard).await?;
    Ok(())
}
