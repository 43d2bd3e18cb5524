//! JSON-RPC surface of a ledger node and a [`LedgerClient`](ferry_ledger::LedgerClient)
//! that talks to it.

mod client;
mod errors;
mod server;
mod types;

use ferry_ledger::{RawEvent, RuntimeId};
use ferry_primitives::Address;
use jsonrpsee::{core::RpcResult, proc_macros::rpc};

pub use client::RpcLedgerClient;
pub use errors::{
    from_client_error, to_rpc_error, CODEC_CODE, INTERNAL_CODE, REJECTED_CODE, ROUND_UNAVAILABLE_CODE,
    UNKNOWN_RUNTIME_CODE,
};
pub use server::LedgerRpcImpl;
pub use types::HexBytes;

/// Ledger methods a node serves for one or more runtimes.
#[rpc(server, client, namespace = "ledger")]
pub trait LedgerRpc {
    /// Submits an encoded transaction and returns its encoded call result.
    #[method(name = "submitTx")]
    async fn submit_tx(&self, runtime_id: RuntimeId, tx: HexBytes) -> RpcResult<HexBytes>;

    /// Raw events of a finalized round, in emission order.
    #[method(name = "getEvents")]
    async fn get_events(&self, runtime_id: RuntimeId, round: u64) -> RpcResult<Vec<RawEvent>>;

    /// Next nonce expected from an account.
    #[method(name = "getNonce")]
    async fn get_nonce(&self, runtime_id: RuntimeId, address: Address) -> RpcResult<u64>;

    /// Latest finalized round.
    #[method(name = "getLatestRound")]
    async fn get_latest_round(&self, runtime_id: RuntimeId) -> RpcResult<u64>;
}
