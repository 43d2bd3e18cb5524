use ferry_primitives::CryptoError;
use thiserror::Error;

/// Why a transaction is structurally unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),

    #[error("transaction carries no signatures")]
    NoSignatures,

    #[error("{signers} signers but {signatures} signatures")]
    SignatureCountMismatch { signers: usize, signatures: usize },

    #[error("undecodable: {0}")]
    Encoding(String),
}

/// Errors building, signing or checking a transaction.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("malformed transaction: {0}")]
    Malformed(MalformedReason),

    #[error("signer at index {index} does not match declared signer info")]
    SignerMismatch { index: usize },

    #[error("all {0} declared signers already signed")]
    AlreadyFullySigned(usize),

    #[error("invalid signature at index {index}: {source}")]
    InvalidSignature {
        index: usize,
        #[source]
        source: CryptoError,
    },

    #[error("signing: {0}")]
    Signing(#[from] CryptoError),

    #[error("encoding: {0}")]
    Codec(#[from] std::io::Error),
}

impl TxError {
    /// True if this is the structural failure class that must never be submitted.
    pub fn is_malformed(&self) -> bool {
        matches!(self, TxError::Malformed(_))
    }
}

impl From<MalformedReason> for TxError {
    fn from(reason: MalformedReason) -> Self {
        TxError::Malformed(reason)
    }
}
