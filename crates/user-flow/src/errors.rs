use std::time::Duration;

use ferry_bridge_types::LockId;
use ferry_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockFlowError {
    /// The lock call executed and failed. Nothing was locked.
    #[error("lock failed in {module} with code {code}")]
    Rejected { module: String, code: u32 },

    /// The lock went through but no quorum was seen in time. It may still complete later.
    #[error("lock {id}: no quorum within {waited:?}")]
    Timeout { id: LockId, waited: Duration },

    /// The block subscription ended before a quorum was seen.
    #[error("lock {id}: block subscription terminated before quorum")]
    SubscriptionTerminated { id: LockId },

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("encoding: {0}")]
    Encoding(String),
}

impl LockFlowError {
    /// Id of the lock, if it was accepted by the ledger.
    pub fn lock_id(&self) -> Option<LockId> {
        match self {
            LockFlowError::Timeout { id, .. } | LockFlowError::SubscriptionTerminated { id } => {
                Some(*id)
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LockFlowError::Timeout { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("only {valid} valid witness signatures, quorum is {quorum}")]
    InsufficientSignatures { valid: usize, quorum: usize },

    #[error("encoding lock payload: {0}")]
    Encoding(String),
}
