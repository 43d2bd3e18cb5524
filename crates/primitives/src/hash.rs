//! Hashing used for address derivation and signature pre-hashing.

use sha2::{Digest, Sha512_256};

/// Computes SHA-512/256 over the concatenation of the given byte slices.
pub fn sha512_256_list(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
