use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use super::{CryptoError, PublicKey, Signature, SignatureContext, Signer};
use crate::hash::sha512_256_list;

/// Compressed Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Ed25519PublicKey([u8; 32]);

impl_fixed_bytes!(Ed25519PublicKey, 32);

/// Digest actually signed: the context is length-prefixed so `(ctx, msg)` pairs with the
/// same concatenation still produce distinct digests.
pub(super) fn signing_digest(context: &SignatureContext, message: &[u8]) -> [u8; 32] {
    let ctx = context.as_bytes();
    let ctx_len = (ctx.len() as u32).to_be_bytes();
    sha512_256_list(&[&ctx_len, ctx, message])
}

impl Ed25519PublicKey {
    pub(super) fn verify(
        &self,
        context: &SignatureContext,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        let vk = VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::MalformedPublicKey)?;
        let sig = ed25519_dalek::Signature::from_slice(signature.as_bytes())
            .map_err(|_| CryptoError::MalformedSignature)?;
        vk.verify_strict(&signing_digest(context, message), &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

/// In-memory Ed25519 signing key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Builds a signer from a 32 byte secret seed. The caller's copy is not cleared.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let seed = Zeroizing::new(seed);
        Self {
            key: SigningKey::from_bytes(&*seed),
        }
    }

    /// Builds a signer from a seed slice, failing if it is not exactly 32 bytes.
    pub fn try_from_slice(seed: &[u8]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| CryptoError::MalformedSecretKey)?;
        Ok(Self::from_seed(seed))
    }

    pub fn ed25519_public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.key.verifying_key().to_bytes())
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> PublicKey {
        PublicKey::Ed25519(self.ed25519_public_key())
    }

    fn sign(&self, context: &SignatureContext, message: &[u8]) -> Result<Signature, CryptoError> {
        let sig = self.key.sign(&signing_digest(context, message));
        Ok(Signature::new(sig.to_bytes().to_vec()))
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.ed25519_public_key())
            .finish_non_exhaustive()
    }
}
