use std::{io, path::PathBuf};

use ferry_bridge_types::LockId;
use ferry_ledger::LedgerError;
use ferry_primitives::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum WitnessError {
    /// The ledger executed the witness call and it failed.
    #[error("lock {id}: witness call failed in {module} with code {code}")]
    BusinessRejection { id: LockId, module: String, code: u32 },

    /// The ledger refused the witness transaction.
    #[error("lock {id}: witness transaction rejected by {module} with code {code}")]
    Rejected { id: LockId, module: String, code: u32 },

    #[error("lock {id}: ledger unreachable after {attempts} attempts: {source}")]
    TransportExhausted {
        id: LockId,
        attempts: u32,
        #[source]
        source: LedgerError,
    },

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("block subscription terminated")]
    SubscriptionTerminated,

    #[error("signing: {0}")]
    Signing(#[from] CryptoError),

    #[error("encoding: {0}")]
    Encoding(String),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl WitnessError {
    /// Whether the coordinator must stop. Non-fatal errors only affect a single lock.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            WitnessError::BusinessRejection { .. } | WitnessError::Rejected { .. }
        )
    }
}
