//! Account addresses.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{hash::sha512_256_list, PublicKey};

/// Address derivation context for Ed25519 keys.
pub const ADDRESS_V0_ED25519_CONTEXT: &[u8] = b"ferry/address: ed25519";

/// Address derivation context for secp256k1 keys.
pub const ADDRESS_V0_SECP256K1_CONTEXT: &[u8] = b"ferry/address: secp256k1";

/// Current address version.
pub const ADDRESS_V0_VERSION: u8 = 0;

const ADDRESS_DIGEST_LEN: usize = 20;

/// An account address: a version byte followed by a truncated hash of the
/// derivation context and key material.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Address([u8; 21]);

impl_fixed_bytes!(Address, 21);

impl Address {
    /// Derives an address from a context, version and data. Pure function of its inputs.
    pub fn derive(context: &[u8], version: u8, data: &[u8]) -> Self {
        let digest = sha512_256_list(&[context, &[version], data]);
        let mut out = [0u8; 21];
        out[0] = version;
        out[1..].copy_from_slice(&digest[..ADDRESS_DIGEST_LEN]);
        Self(out)
    }

    /// Address owned by a public key.
    pub fn from_pk(pk: &PublicKey) -> Self {
        let context = match pk {
            PublicKey::Ed25519(_) => ADDRESS_V0_ED25519_CONTEXT,
            PublicKey::Secp256k1(_) => ADDRESS_V0_SECP256K1_CONTEXT,
        };
        Self::derive(context, ADDRESS_V0_VERSION, pk.as_bytes())
    }

    pub fn version(&self) -> u8 {
        self.0[0]
    }
}
