use borsh::{BorshDeserialize, BorshSerialize};

use super::{CryptoError, Signature, SignatureContext};

/// Compressed secp256k1 public key.
///
/// Keys of this scheme can be carried and turned into addresses, but no verifier is wired
/// up for them, so every signature check against one fails.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Secp256k1PublicKey([u8; 33]);

impl_fixed_bytes!(Secp256k1PublicKey, 33);

impl Secp256k1PublicKey {
    pub(super) fn verify(
        &self,
        _context: &SignatureContext,
        _message: &[u8],
        _signature: &Signature,
    ) -> Result<(), CryptoError> {
        Err(CryptoError::UnsupportedScheme("secp256k1"))
    }
}
