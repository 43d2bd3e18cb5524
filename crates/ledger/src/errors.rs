use ferry_tx_types::{CoreError, CORE_MODULE_NAME};
use thiserror::Error;

use crate::RuntimeId;

/// Errors at the ledger boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The request did not complete. The call may or may not have executed.
    #[error("transport: {0}")]
    Transport(String),

    /// The ledger refused the transaction before executing it.
    #[error("rejected by {module} with code {code}")]
    Rejected { module: String, code: u32 },

    #[error("block subscription closed")]
    SubscriptionClosed,

    #[error("round {0} is not available")]
    RoundUnavailable(u64),

    #[error("codec: {0}")]
    Codec(String),

    #[error("building transaction: {0}")]
    Build(String),

    #[error("node does not serve runtime {0}")]
    UnknownRuntime(RuntimeId),
}

impl LedgerError {
    /// Worth retrying after a backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Transport(_))
    }

    /// The transaction carried a nonce the ledger no longer accepts.
    pub fn is_stale_nonce(&self) -> bool {
        matches!(
            self,
            LedgerError::Rejected { module, code }
                if module == CORE_MODULE_NAME && *code == CoreError::CODE_INVALID_NONCE
        )
    }
}

impl From<ferry_tx_types::TxError> for LedgerError {
    fn from(err: ferry_tx_types::TxError) -> Self {
        LedgerError::Codec(err.to_string())
    }
}
