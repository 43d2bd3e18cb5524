use std::error::Error as StdError;

use thiserror::Error;

use crate::{CallResult, TxError};

/// Name under which dispatch-level failures are reported.
pub const CORE_MODULE_NAME: &str = "core";

/// An error that a runtime module surfaces to callers as a stable `(module, code)` pair.
pub trait ModuleError: StdError {
    /// Name of the module that raised the error.
    fn module(&self) -> &str;

    /// Module-scoped numeric code. Codes are never reused within a module.
    fn code(&self) -> u32;

    fn to_call_result(&self) -> CallResult {
        CallResult::Failed {
            module: self.module().to_owned(),
            code: self.code(),
        }
    }
}

/// Failures raised before a call reaches its module.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed transaction")]
    MalformedTransaction,

    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] TxError),

    #[error("invalid method")]
    InvalidMethod,

    #[error("invalid nonce: expected {expected}, got {actual}")]
    InvalidNonce { expected: u64, actual: u64 },

    #[error("invalid signature")]
    InvalidSignature,
}

impl CoreError {
    pub const CODE_MALFORMED_TRANSACTION: u32 = 1;
    pub const CODE_INVALID_TRANSACTION: u32 = 2;
    pub const CODE_INVALID_METHOD: u32 = 3;
    pub const CODE_INVALID_NONCE: u32 = 4;
    pub const CODE_INVALID_SIGNATURE: u32 = 5;
}

impl ModuleError for CoreError {
    fn module(&self) -> &str {
        CORE_MODULE_NAME
    }

    fn code(&self) -> u32 {
        match self {
            CoreError::MalformedTransaction => Self::CODE_MALFORMED_TRANSACTION,
            CoreError::InvalidTransaction(_) => Self::CODE_INVALID_TRANSACTION,
            CoreError::InvalidMethod => Self::CODE_INVALID_METHOD,
            CoreError::InvalidNonce { .. } => Self::CODE_INVALID_NONCE,
            CoreError::InvalidSignature => Self::CODE_INVALID_SIGNATURE,
        }
    }
}

/// Splits a `module.Method` string into its two halves.
///
/// Exactly one separator is allowed and neither half may be empty.
pub fn split_method(method: &str) -> Result<(&str, &str), CoreError> {
    match method.split_once('.') {
        Some((module, name))
            if !module.is_empty() && !name.is_empty() && !name.contains('.') =>
        {
            Ok((module, name))
        }
        _ => Err(CoreError::InvalidMethod),
    }
}
