//! Public keys, signatures and signers.
//!
//! A [`PublicKey`] is a sum over the supported key schemes and always carries exactly one
//! scheme. Every verification goes through a [`ContextPolicy`] which decides whether the
//! signature context the caller asked for is acceptable on that call path.

mod context;
mod ed25519;
mod secp256k1;

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use context::{
    ContextPolicy, SignatureContext, TX_SIGNATURE_CONTEXT, WITNESS_SIGNATURE_CONTEXT,
};
pub use ed25519::{Ed25519PublicKey, Ed25519Signer};
pub use secp256k1::Secp256k1PublicKey;

/// Errors from key handling, signing and verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("malformed public key")]
    MalformedPublicKey,

    #[error("malformed secret key")]
    MalformedSecretKey,

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("signature context not allowed by policy: {0}")]
    ContextNotAllowed(SignatureContext),

    #[error("key scheme {0} does not support this operation")]
    UnsupportedScheme(&'static str),
}

/// A public key used for signing.
#[derive(
    Clone,
    Debug,
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
#[serde(try_from = "PublicKeyRepr", into = "PublicKeyRepr")]
pub enum PublicKey {
    Ed25519(Ed25519PublicKey),
    Secp256k1(Secp256k1PublicKey),
}

impl PublicKey {
    /// Name of the key scheme, stable for logging.
    pub fn scheme(&self) -> &'static str {
        match self {
            PublicKey::Ed25519(_) => "ed25519",
            PublicKey::Secp256k1(_) => "secp256k1",
        }
    }

    /// Raw key bytes in the scheme's native layout.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(pk) => pk.as_ref(),
            PublicKey::Secp256k1(pk) => pk.as_ref(),
        }
    }

    /// Verifies `signature` over `(context, message)`, reporting why it failed.
    pub fn try_verify(
        &self,
        policy: &ContextPolicy,
        context: &SignatureContext,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        policy.check(context)?;
        match self {
            PublicKey::Ed25519(pk) => pk.verify(context, message, signature),
            PublicKey::Secp256k1(pk) => pk.verify(context, message, signature),
        }
    }

    /// Returns true iff `signature` is valid for this key over `(context, message)` and the
    /// context is permitted by `policy`. Never panics.
    pub fn verify(
        &self,
        policy: &ContextPolicy,
        context: &SignatureContext,
        message: &[u8],
        signature: &Signature,
    ) -> bool {
        self.try_verify(policy, context, message, signature).is_ok()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKey::Ed25519(pk) => write!(f, "ed25519:{pk}"),
            PublicKey::Secp256k1(pk) => write!(f, "secp256k1:{pk}"),
        }
    }
}

/// Human readable form: an object with exactly one populated scheme field.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublicKeyRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ed25519: Option<Ed25519PublicKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    secp256k1: Option<Secp256k1PublicKey>,
}

impl TryFrom<PublicKeyRepr> for PublicKey {
    type Error = String;

    fn try_from(repr: PublicKeyRepr) -> Result<Self, Self::Error> {
        match (repr.ed25519, repr.secp256k1) {
            (Some(pk), None) => Ok(PublicKey::Ed25519(pk)),
            (None, Some(pk)) => Ok(PublicKey::Secp256k1(pk)),
            (None, None) => Err("public key: no scheme populated".to_owned()),
            (Some(_), Some(_)) => Err("public key: more than one scheme populated".to_owned()),
        }
    }
}

impl From<PublicKey> for PublicKeyRepr {
    fn from(pk: PublicKey) -> Self {
        match pk {
            PublicKey::Ed25519(pk) => PublicKeyRepr {
                ed25519: Some(pk),
                secp256k1: None,
            },
            PublicKey::Secp256k1(pk) => PublicKeyRepr {
                ed25519: None,
                secp256k1: Some(pk),
            },
        }
    }
}

/// Variable-length opaque detached signature.
#[derive(
    Clone, Default, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Signature(#[serde(with = "hex::serde")] Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Signature {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

/// Something that can produce detached signatures for a single key.
pub trait Signer: Send + Sync {
    /// Public key matching the signatures produced.
    fn public_key(&self) -> PublicKey;

    /// Signs `message` under `context`.
    fn sign(&self, context: &SignatureContext, message: &[u8]) -> Result<Signature, CryptoError>;
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn signer(seed: u8) -> Ed25519Signer {
        Ed25519Signer::from_seed([seed; 32])
    }

    #[test]
    fn test_sign_verify() {
        let alice = signer(1);
        let pk = alice.public_key();
        let ctx = SignatureContext::from(WITNESS_SIGNATURE_CONTEXT);
        let sig = alice.sign(&ctx, b"message").unwrap();

        assert!(pk.verify(&ContextPolicy::default(), &ctx, b"message", &sig));
        assert!(!pk.verify(&ContextPolicy::default(), &ctx, b"massage", &sig));
        assert!(!signer(2)
            .public_key()
            .verify(&ContextPolicy::default(), &ctx, b"message", &sig));
    }

    #[test]
    fn test_strict_policy_rejects_unregistered_context() {
        let carol = signer(3);
        let ctx = SignatureContext::new(b"some-other-runtime/ctx".to_vec());
        let sig = carol.sign(&ctx, b"msg").unwrap();
        let pk = carol.public_key();

        assert_eq!(
            pk.try_verify(&ContextPolicy::default(), &ctx, b"msg", &sig),
            Err(CryptoError::ContextNotAllowed(ctx.clone()))
        );
        assert!(pk.verify(&ContextPolicy::Relaxed, &ctx, b"msg", &sig));
    }

    #[test]
    fn test_secp256k1_fails_closed() {
        let pk = PublicKey::Secp256k1(Secp256k1PublicKey::new([2; 33]));
        let ctx = SignatureContext::from(TX_SIGNATURE_CONTEXT);
        let sig = Signature::new(vec![0; 64]);
        assert!(!pk.verify(&ContextPolicy::Relaxed, &ctx, b"msg", &sig));
        assert_eq!(
            pk.try_verify(&ContextPolicy::Relaxed, &ctx, b"msg", &sig),
            Err(CryptoError::UnsupportedScheme("secp256k1"))
        );
    }

    #[test]
    fn test_public_key_json_exactly_one_variant() {
        let pk = signer(4).public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert!(json.starts_with("{\"ed25519\":"));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);

        let none = serde_json::from_str::<PublicKey>("{}");
        assert!(none.is_err());

        let hex32 = "11".repeat(32);
        let hex33 = "02".repeat(33);
        let both = format!("{{\"ed25519\":\"{hex32}\",\"secp256k1\":\"{hex33}\"}}");
        assert!(serde_json::from_str::<PublicKey>(&both).is_err());

        let unknown = format!("{{\"sr25519\":\"{hex32}\"}}");
        assert!(serde_json::from_str::<PublicKey>(&unknown).is_err());
    }

    #[test]
    fn test_public_key_borsh_rejects_unknown_scheme() {
        let mut raw = borsh::to_vec(&signer(5).public_key()).unwrap();
        raw[0] = 7;
        assert!(borsh::from_slice::<PublicKey>(&raw).is_err());
    }

    proptest! {
        #[test]
        fn proptest_signature_bit_flips(
            seed in any::<[u8; 32]>(),
            msg in prop::collection::vec(any::<u8>(), 1..128),
            bit in any::<prop::sample::Index>(),
            target in 0usize..3,
        ) {
            let signer = Ed25519Signer::from_seed(seed);
            let pk = signer.public_key();
            let policy = ContextPolicy::Relaxed;
            let ctx = SignatureContext::from(WITNESS_SIGNATURE_CONTEXT);
            let sig = signer.sign(&ctx, &msg).unwrap();
            prop_assert!(pk.verify(&policy, &ctx, &msg, &sig));

            let flip = |data: &mut Vec<u8>| {
                let pos = bit.index(data.len() * 8);
                data[pos / 8] ^= 1 << (pos % 8);
            };

            match target {
                0 => {
                    let mut msg = msg.clone();
                    flip(&mut msg);
                    prop_assert!(!pk.verify(&policy, &ctx, &msg, &sig));
                }
                1 => {
                    let mut raw = ctx.as_bytes().to_vec();
                    flip(&mut raw);
                    let ctx = SignatureContext::new(raw);
                    prop_assert!(!pk.verify(&policy, &ctx, &msg, &sig));
                }
                _ => {
                    let mut raw = sig.clone().into_inner();
                    flip(&mut raw);
                    let sig = Signature::new(raw);
                    prop_assert!(!pk.verify(&policy, &ctx, &msg, &sig));
                }
            }
        }

        #[test]
        fn proptest_public_key_borsh_roundtrip(seed in any::<[u8; 32]>()) {
            let pk = Ed25519Signer::from_seed(seed).public_key();
            let enc = borsh::to_vec(&pk).unwrap();
            let dec: PublicKey = borsh::from_slice(&enc).unwrap();
            prop_assert_eq!(dec, pk);
        }
    }
}
