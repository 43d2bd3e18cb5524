use std::{collections::BTreeSet, fmt};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use super::CryptoError;

/// Context for signatures over transaction envelopes.
pub const TX_SIGNATURE_CONTEXT: &[u8] = b"ferry/tx: v1";

/// Context for witness attestations over lock events.
pub const WITNESS_SIGNATURE_CONTEXT: &[u8] = b"ferry/bridge: witness";

/// Domain separation tag mixed into every signature.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SignatureContext(#[serde(with = "hex::serde")] Vec<u8>);

impl SignatureContext {
    pub fn new(raw: Vec<u8>) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for SignatureContext {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl fmt::Debug for SignatureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureContext({self})")
    }
}

impl fmt::Display for SignatureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.write_str(s),
            Err(_) => f.write_str(&hex::encode(&self.0)),
        }
    }
}

/// Decides which signature contexts a verification call path accepts.
///
/// This is passed explicitly to every verification rather than configured process-wide, so
/// strict and relaxed verification can coexist in one process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextPolicy {
    /// Only the registered, non-empty contexts are accepted.
    Strict(BTreeSet<SignatureContext>),

    /// Any context is accepted, including ones chosen at runtime.
    Relaxed,
}

impl ContextPolicy {
    /// Strict policy over an explicit set of contexts.
    pub fn strict(contexts: impl IntoIterator<Item = SignatureContext>) -> Self {
        Self::Strict(contexts.into_iter().collect())
    }

    /// Adds a context to a strict policy. No-op for a relaxed policy.
    pub fn register(&mut self, context: SignatureContext) {
        if let Self::Strict(set) = self {
            set.insert(context);
        }
    }

    pub fn check(&self, context: &SignatureContext) -> Result<(), CryptoError> {
        match self {
            Self::Relaxed => Ok(()),
            Self::Strict(set) => {
                if context.as_bytes().is_empty() || !set.contains(context) {
                    return Err(CryptoError::ContextNotAllowed(context.clone()));
                }
                Ok(())
            }
        }
    }
}

impl Default for ContextPolicy {
    /// Strict over the two contexts the protocol itself uses.
    fn default() -> Self {
        Self::strict([
            SignatureContext::from(TX_SIGNATURE_CONTEXT),
            SignatureContext::from(WITNESS_SIGNATURE_CONTEXT),
        ])
    }
}
