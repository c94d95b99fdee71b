//! # ethkit-crypto
//!
//! Cryptographic primitives for ethkit.
//!
//! - Keccak-256 hashing and 4-byte selectors
//! - ECDSA signing/verification (secp256k1, low-s)
//! - Public key recovery and address derivation
//! - EIP-55 checksum rendering

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checksum;
mod error;
mod hash;
mod signature;

pub use checksum::to_checksum_address;
pub use error::CryptoError;
pub use hash::{keccak256, selector};
pub use signature::{
    public_key_to_address, recover_address, recover_public_key, sign, verify, PrivateKey,
    PublicKey, Signature,
};
