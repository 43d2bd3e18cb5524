use std::sync::Arc;

use async_trait::async_trait;
use ferry_ledger::{LedgerClient, LedgerError, RawEvent, RuntimeId};
use ferry_primitives::Address;
use jsonrpsee::core::RpcResult;
use tracing::*;

use crate::{to_rpc_error, HexBytes, LedgerRpcServer};

/// Serves the ledger RPC for a single runtime backed by any [`LedgerClient`].
#[derive(Debug)]
pub struct LedgerRpcImpl<L> {
    runtime_id: RuntimeId,
    ledger: Arc<L>,
}

impl<L> LedgerRpcImpl<L> {
    pub fn new(runtime_id: RuntimeId, ledger: Arc<L>) -> Self {
        Self { runtime_id, ledger }
    }

    fn check_runtime(&self, runtime_id: RuntimeId) -> RpcResult<()> {
        if runtime_id != self.runtime_id {
            return Err(to_rpc_error(LedgerError::UnknownRuntime(runtime_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl<L: LedgerClient + 'static> LedgerRpcServer for LedgerRpcImpl<L> {
    async fn submit_tx(&self, runtime_id: RuntimeId, tx: HexBytes) -> RpcResult<HexBytes> {
        self.check_runtime(runtime_id)?;
        trace!(len = tx.0.len(), "rpc submit_tx");
        self.ledger
            .submit_tx(tx.into_inner())
            .await
            .map(HexBytes::from)
            .map_err(to_rpc_error)
    }

    async fn get_events(&self, runtime_id: RuntimeId, round: u64) -> RpcResult<Vec<RawEvent>> {
        self.check_runtime(runtime_id)?;
        self.ledger.get_events(round).await.map_err(to_rpc_error)
    }

    async fn get_nonce(&self, runtime_id: RuntimeId, address: Address) -> RpcResult<u64> {
        self.check_runtime(runtime_id)?;
        self.ledger.get_nonce(address).await.map_err(to_rpc_error)
    }

    async fn get_latest_round(&self, runtime_id: RuntimeId) -> RpcResult<u64> {
        self.check_runtime(runtime_id)?;
        self.ledger.latest_round().await.map_err(to_rpc_error)
    }
}
