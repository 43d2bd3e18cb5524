//! Mapping between [`LedgerError`] and JSON-RPC error objects.

use ferry_ledger::LedgerError;
use jsonrpsee::{core::ClientError, types::ErrorObjectOwned};
use serde::{Deserialize, Serialize};

/// The transaction was refused before execution. Data is a [`RejectedData`].
pub const REJECTED_CODE: i32 = -32010;

/// The requested round is unknown. Data is the round.
pub const ROUND_UNAVAILABLE_CODE: i32 = -32011;

/// The node does not serve the requested runtime. Data is the runtime id.
pub const UNKNOWN_RUNTIME_CODE: i32 = -32012;

/// Undecodable request payload.
pub const CODEC_CODE: i32 = -32013;

/// Anything else that went wrong on the node.
pub const INTERNAL_CODE: i32 = -32000;

#[derive(Debug, Serialize, Deserialize)]
struct RejectedData {
    module: String,
    code: u32,
}

/// Server side: turns a ledger error into a JSON-RPC error object.
pub fn to_rpc_error(err: LedgerError) -> ErrorObjectOwned {
    let msg = err.to_string();
    match err {
        LedgerError::Rejected { module, code } => {
            ErrorObjectOwned::owned(REJECTED_CODE, msg, Some(RejectedData { module, code }))
        }
        LedgerError::RoundUnavailable(round) => {
            ErrorObjectOwned::owned(ROUND_UNAVAILABLE_CODE, msg, Some(round))
        }
        LedgerError::UnknownRuntime(id) => {
            ErrorObjectOwned::owned(UNKNOWN_RUNTIME_CODE, msg, Some(id))
        }
        LedgerError::Codec(_) | LedgerError::Build(_) => {
            ErrorObjectOwned::owned(CODEC_CODE, msg, None::<()>)
        }
        LedgerError::Transport(_) | LedgerError::SubscriptionClosed => {
            ErrorObjectOwned::owned(INTERNAL_CODE, msg, None::<()>)
        }
    }
}

/// Client side: recovers the ledger error a node reported. Everything that is not a
/// well-formed error response counts as a transport failure.
pub fn from_client_error(err: ClientError) -> LedgerError {
    match err {
        ClientError::Call(obj) => from_error_object(&obj),
        ClientError::ParseError(e) => LedgerError::Codec(e.to_string()),
        other => LedgerError::Transport(other.to_string()),
    }
}

fn from_error_object(obj: &ErrorObjectOwned) -> LedgerError {
    let data = obj.data().map(|raw| raw.get());
    let parsed = match obj.code() {
        REJECTED_CODE => data
            .and_then(|d| serde_json::from_str::<RejectedData>(d).ok())
            .map(|d| LedgerError::Rejected {
                module: d.module,
                code: d.code,
            }),
        ROUND_UNAVAILABLE_CODE => data
            .and_then(|d| serde_json::from_str(d).ok())
            .map(LedgerError::RoundUnavailable),
        UNKNOWN_RUNTIME_CODE => data
            .and_then(|d| serde_json::from_str(d).ok())
            .map(LedgerError::UnknownRuntime),
        CODEC_CODE => Some(LedgerError::Codec(obj.message().to_owned())),
        _ => None,
    };
    parsed.unwrap_or_else(|| LedgerError::Transport(format!("{}: {}", obj.code(), obj.message())))
}

#[cfg(test)]
mod tests {
    use ferry_ledger::RuntimeId;

    use super::*;

    fn round_trip(err: LedgerError) -> LedgerError {
        from_client_error(ClientError::Call(to_rpc_error(err)))
    }

    #[test]
    fn test_structured_errors_survive_the_wire() {
        let rejected = LedgerError::Rejected {
            module: "core".into(),
            code: 4,
        };
        assert_eq!(round_trip(rejected.clone()), rejected);
        assert!(round_trip(rejected).is_stale_nonce());

        assert_eq!(
            round_trip(LedgerError::RoundUnavailable(17)),
            LedgerError::RoundUnavailable(17)
        );

        let id = RuntimeId::from([3; 32]);
        assert_eq!(
            round_trip(LedgerError::UnknownRuntime(id)),
            LedgerError::UnknownRuntime(id)
        );
    }

    #[test]
    fn test_node_failures_are_transient() {
        let err = round_trip(LedgerError::Transport("disk full".into()));
        assert!(err.is_transient());

        let unknown = ErrorObjectOwned::owned(-32601, "method not found", None::<()>);
        assert!(from_client_error(ClientError::Call(unknown)).is_transient());
    }
}
