use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context};
use ferry_config::Config;
use ferry_primitives::{BaseUnits, Denomination};
use ferry_rpc_api::RpcLedgerClient;
use ferry_tx_types::Fee;
use ferry_user_flow::{LockFlow, LockFlowError};
use tracing::*;

use crate::{args::LockArgs, helpers::load_signer};

pub(crate) async fn run(
    config: &Config,
    ledger: RpcLedgerClient,
    args: LockArgs,
) -> anyhow::Result<()> {
    let lconfig = config
        .lock
        .as_ref()
        .context("config: missing [lock] section")?;

    let signer = load_signer(&lconfig.key_path)?;
    let deadline = args
        .deadline_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| lconfig.deadline());
    let denomination = match args.denomination {
        Some(d) => Denomination::new(d.into_bytes()),
        None => Denomination::NATIVE,
    };
    let amount = BaseUnits::new(args.amount, denomination);
    let fee = Fee::new(BaseUnits::native(lconfig.fee_amount), lconfig.fee_gas);

    let flow = LockFlow::new(Arc::new(ledger), Arc::new(signer), fee, deadline);

    let res = tokio::select! {
        res = flow.run(amount) => res,
        _ = tokio::signal::ctrl_c() => bail!("interrupted before the quorum was seen"),
    };

    match res {
        Ok(proof) => {
            println!("{}", serde_json::to_string_pretty(&proof)?);
            Ok(())
        }
        Err(err @ LockFlowError::Timeout { id, .. }) => {
            warn!(lock_id = %id, "lock may still complete later");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
