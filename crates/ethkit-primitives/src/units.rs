//! Currency denominations
//!
//! `Wei`, `Gwei` and `Ether` each wrap a `U256` count of their own unit.
//! Converting to a larger unit divides and truncates; the remainder is lost.

use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Common behavior of the three denominations
pub trait Denomination: Sized + Copy {
    /// Power of ten relative to wei
    const DECIMALS: usize;

    /// Raw count of this unit
    fn raw(&self) -> U256;

    /// Build from a raw count of this unit
    fn from_raw(value: U256) -> Self;

    /// Convert into another denomination.
    ///
    /// Scaling down truncates toward zero; scaling up saturates at `U256::MAX`.
    fn convert<T: Denomination>(&self) -> T {
        let value = if T::DECIMALS > Self::DECIMALS {
            self.raw() / U256::exp10(T::DECIMALS - Self::DECIMALS)
        } else {
            self.raw()
                .saturating_mul(U256::exp10(Self::DECIMALS - T::DECIMALS))
        };
        T::from_raw(value)
    }

    /// Convert to wei
    fn to_wei(&self) -> Wei {
        self.convert()
    }

    /// Convert to gwei (lossy when scaling down)
    fn to_gwei(&self) -> Gwei {
        self.convert()
    }

    /// Convert to ether (lossy when scaling down)
    fn to_ether(&self) -> Ether {
        self.convert()
    }
}

/// Parse hex text permissively: empty or malformed input yields zero.
fn permissive_hex(s: &str) -> U256 {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return U256::zero();
    }
    U256::from_str_radix(digits, 16).unwrap_or_default()
}

macro_rules! denomination {
    ($(#[$meta:meta])* $name:ident, $decimals:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(U256);

        impl $name {
            /// Zero amount
            pub fn zero() -> Self {
                Self(U256::zero())
            }

            /// Wrap a raw count of this unit
            pub fn new(value: U256) -> Self {
                Self(value)
            }

            /// Parse hex text (with or without `0x`). Never fails: bad input is zero.
            pub fn from_hex(s: &str) -> Self {
                Self(permissive_hex(s))
            }

            /// Parse decimal text. Never fails: bad input is zero.
            pub fn from_dec_str(s: &str) -> Self {
                Self(U256::from_dec_str(s.trim()).unwrap_or_default())
            }

            /// Underlying integer
            pub fn value(&self) -> U256 {
                self.0
            }

            /// Check if zero
            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }
        }

        impl Denomination for $name {
            const DECIMALS: usize = $decimals;

            fn raw(&self) -> U256 {
                self.0
            }

            fn from_raw(value: U256) -> Self {
                Self(value)
            }
        }

        impl From<U256> for $name {
            fn from(value: U256) -> Self {
                Self(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(U256::from(value))
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(U256::from(value))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&crate::to_quantity(&self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from_hex(&s))
            }
        }
    };
}

denomination!(
    /// Base unit (10^0)
    Wei,
    0
);

denomination!(
    /// 10^9 wei
    Gwei,
    9
);

denomination!(
    /// 10^18 wei
    Ether,
    18
);
