use ferry_bridge_types::{BridgeError, LockId};
use ferry_primitives::{Address, CryptoError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("{0} is not an authorized witness")]
    NotAuthorized(Address),

    #[error("unknown lock {0}")]
    UnknownLock(LockId),

    #[error("lock {0} is already recorded")]
    LockExists(LockId),

    #[error("invalid witness signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    #[error("encoding lock payload: {0}")]
    Payload(String),
}

impl From<AggregatorError> for BridgeError {
    fn from(err: AggregatorError) -> Self {
        match err {
            AggregatorError::NotAuthorized(_) => BridgeError::NotAuthorized,
            AggregatorError::UnknownLock(_) | AggregatorError::LockExists(_) => {
                BridgeError::InvalidSequenceNumber
            }
            AggregatorError::InvalidSignature(_) => BridgeError::InvalidSignature,
            AggregatorError::Payload(_) => BridgeError::InvalidArgument,
        }
    }
}
