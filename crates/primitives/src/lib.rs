//! Value types shared by every ferry component: account addresses, token amounts,
//! public keys, signatures and the signing contexts they are bound to.

#[macro_use]
mod macros;

pub mod address;
pub mod crypto;
pub mod hash;
pub mod token;
pub mod utils;

pub use address::Address;
pub use crypto::{
    ContextPolicy, CryptoError, Ed25519PublicKey, Ed25519Signer, PublicKey, Secp256k1PublicKey,
    Signature, SignatureContext, Signer,
};
pub use token::{BaseUnits, Denomination, Quantity};
