//! Ethereum-compatible address type (20 bytes)
//!
//! The address keeps the hex text it was built from, so checksummed
//! mixed-case input round-trips verbatim. No checksum validation happens here.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of hex characters in an address (without prefix)
const HEX_LEN: usize = 40;

/// Address parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Wrong number of hex characters after the optional `0x`
    #[error("invalid address length: expected 40 hex characters, got {0}")]
    InvalidLength(usize),
    /// Non-hex character in the address body
    #[error("invalid address characters: {0}")]
    InvalidCharacters(String),
}

/// Ethereum-compatible 20-byte address
#[derive(Clone)]
pub struct Address {
    text: String,
    bytes: [u8; 20],
}

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Zero address (0x0000...0000)
    pub fn zero() -> Self {
        Self::from_bytes([0u8; 20])
    }

    /// Create address from raw bytes (rendered as lowercase hex)
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self {
            text: format!("0x{}", hex::encode(bytes)),
            bytes,
        }
    }

    /// Create address from a 20-byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 20] = slice
            .try_into()
            .map_err(|_| AddressError::InvalidLength(slice.len() * 2))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Parse an address from hex text.
    ///
    /// Accepts exactly 40 hex digits after an optional lowercase `0x`.
    /// An uppercase `0X` prefix is not stripped, so it fails the length check.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let len = digits.chars().count();
        if len != HEX_LEN {
            return Err(AddressError::InvalidLength(len));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidCharacters(format!(
                "unexpected character {:?} in {}",
                bad, s
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| AddressError::InvalidCharacters(e.to_string()))?;

        Ok(Self {
            text: format!("0x{}", digits),
            bytes,
        })
    }

    /// Get the decoded bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.bytes
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 20]
    }

    /// The address text exactly as supplied, `0x`-prefixed
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Convert to hex string with 0x prefix, preserving the original case
    pub fn to_hex(&self) -> String {
        self.text.clone()
    }

    /// Lowercase hex rendering with 0x prefix
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.text)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// RLP implementation (behind feature flag)
#[cfg(feature = "rlp")]
mod rlp_impl {
    use super::*;
    use rlp::{Encodable, RlpStream};

    impl Encodable for Address {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(&self.bytes);
        }
    }
}
