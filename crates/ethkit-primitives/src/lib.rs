//! # ethkit-primitives
//!
//! Primitive types shared by every ethkit crate.
//!
//! - [`Address`]: 20-byte account identifier that keeps the caller's hex text
//! - [`H256`]: 32-byte hash
//! - [`U256`] / [`I256`]: 256-bit unsigned and sign-magnitude integers
//! - [`Wei`], [`Gwei`], [`Ether`]: currency denominations with lossy conversions
//! - [`JsonValue`]: closed dynamic-JSON value used for RPC params and codec arguments

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod int;
mod json;
mod units;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};
pub use int::I256;
pub use json::{JsonError, JsonMap, JsonValue};
pub use units::{Denomination, Ether, Gwei, Wei};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Transaction nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;

/// Render a `U256` as a minimal `0x`-prefixed JSON-RPC quantity (`0x0` for zero).
pub fn to_quantity(value: &U256) -> String {
    format!("0x{:x}", value)
}

/// Parse a strict `0x`-prefixed hex quantity. Returns `None` on anything else.
pub fn parse_quantity(s: &str) -> Option<U256> {
    let digits = s.strip_prefix("0x")?;
    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}
