//! Sign-magnitude 256-bit integer
//!
//! Covers both the `uint256` and `int256` value ranges, which is what the ABI
//! codec needs from a "big integer" argument.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use primitive_types::U256;

/// Signed 256-bit integer stored as magnitude + sign.
///
/// Zero is never negative, so `-0` and `0` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256 {
    abs: U256,
    negative: bool,
}

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256 {
        abs: U256::zero(),
        negative: false,
    };

    /// Create from magnitude and sign
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create a non-negative value
    pub fn from_u256(value: U256) -> Self {
        Self::new(value, false)
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Magnitude
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Parse decimal or `0x` hex text, with an optional leading `-`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let abs = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            U256::from_str_radix(hex, 16).ok()?
        } else {
            if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            U256::from_dec_str(body).ok()?
        };
        Some(Self::new(abs, negative))
    }

    /// Whether the value fits an unsigned integer of `bits` width
    pub fn fits_uint(&self, bits: usize) -> bool {
        !self.negative && self.abs.bits() <= bits
    }

    /// Whether the value fits a two's-complement integer of `bits` width
    pub fn fits_int(&self, bits: usize) -> bool {
        if bits == 0 || bits > 256 {
            return false;
        }
        let limit = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= limit
        } else {
            self.abs < limit
        }
    }

    /// 256-bit two's-complement big-endian word.
    ///
    /// Magnitudes beyond the int256 range wrap; callers range-check first.
    pub fn to_twos_complement(&self) -> [u8; 32] {
        let raw = if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        };
        let mut word = [0u8; 32];
        raw.to_big_endian(&mut word);
        word
    }

    /// Interpret a 32-byte big-endian word as two's complement
    pub fn from_twos_complement(word: &[u8; 32]) -> Self {
        let raw = U256::from_big_endian(word);
        if word[0] & 0x80 != 0 {
            let abs = (!raw).overflowing_add(U256::one()).0;
            // i256::MIN has no positive counterpart; its magnitude is 2^255.
            let abs = if abs.is_zero() { U256::one() << 255 } else { abs };
            Self::new(abs, true)
        } else {
            Self::new(raw, false)
        }
    }

    /// Convert to i64 if it fits
    pub fn to_i64(&self) -> Option<i64> {
        if self.abs.bits() > 64 {
            return None;
        }
        let magnitude = self.abs.low_u64();
        if self.negative {
            if magnitude <= i64::MAX as u64 + 1 {
                Some((magnitude as i128).wrapping_neg() as i64)
            } else {
                None
            }
        } else {
            i64::try_from(magnitude).ok()
        }
    }
}

impl PartialOrd for I256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for I256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.abs.cmp(&other.abs),
            (true, true) => other.abs.cmp(&self.abs),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl FromStr for I256 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid integer: {}", s))
    }
}

impl From<U256> for I256 {
    fn from(value: U256) -> Self {
        Self::from_u256(value)
    }
}

impl From<u64> for I256 {
    fn from(value: u64) -> Self {
        Self::from_u256(U256::from(value))
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value as i128)
    }
}

impl From<u128> for I256 {
    fn from(value: u128) -> Self {
        Self::from_u256(U256::from(value))
    }
}
