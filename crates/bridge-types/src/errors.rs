use ferry_tx_types::ModuleError;
use thiserror::Error;

use crate::BRIDGE_MODULE_NAME;

/// Failures raised by the bridge module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("invalid argument")]
    InvalidArgument,

    #[error("not authorized")]
    NotAuthorized,

    #[error("invalid sequence number")]
    InvalidSequenceNumber,

    #[error("invalid witness signature")]
    InvalidSignature,
}

impl BridgeError {
    pub const CODE_INVALID_ARGUMENT: u32 = 1;
    pub const CODE_NOT_AUTHORIZED: u32 = 2;
    pub const CODE_INVALID_SEQUENCE_NUMBER: u32 = 3;
    pub const CODE_INVALID_SIGNATURE: u32 = 4;
}

impl ModuleError for BridgeError {
    fn module(&self) -> &str {
        BRIDGE_MODULE_NAME
    }

    fn code(&self) -> u32 {
        match self {
            BridgeError::InvalidArgument => Self::CODE_INVALID_ARGUMENT,
            BridgeError::NotAuthorized => Self::CODE_NOT_AUTHORIZED,
            BridgeError::InvalidSequenceNumber => Self::CODE_INVALID_SEQUENCE_NUMBER,
            BridgeError::InvalidSignature => Self::CODE_INVALID_SIGNATURE,
        }
    }
}

/// Invalid witness set parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("witness set is empty")]
    NoWitnesses,

    #[error("duplicate witness {0}")]
    DuplicateWitness(String),

    #[error("quorum {quorum} outside 1..={witnesses}")]
    InvalidQuorum { quorum: usize, witnesses: usize },
}
