//! Dynamic RLP value tree

use ethkit_primitives::{JsonValue, U256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use tracing::warn;

/// A value that can be RLP-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    /// Raw byte string
    Bytes(Vec<u8>),
    /// Text: `0x`-prefixed strings are hex-decoded, anything else is UTF-8
    Str(String),
    /// Non-negative integer, minimal big-endian (zero is the empty string)
    Uint(U256),
    /// Ordered list
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Empty byte string (`0x80`)
    pub fn empty() -> Self {
        RlpItem::Bytes(Vec::new())
    }

    /// Build from a dynamic JSON value.
    ///
    /// Strings, non-negative integers and arrays map directly. Every other
    /// shape becomes the empty string.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => RlpItem::Str(s.clone()),
            JsonValue::Int(i) if *i >= 0 => RlpItem::Uint(U256::from(*i as u64)),
            JsonValue::Array(items) => RlpItem::List(items.iter().map(Self::from_json).collect()),
            other => {
                // TODO: return an error here once callers stop relying on the 0x80 fallback
                warn!(kind = other.kind(), "unsupported RLP input, encoding as empty string");
                RlpItem::empty()
            }
        }
    }

    /// Byte payload of a non-list item
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RlpItem::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of a list item
    pub fn as_list(&self) -> Option<&[RlpItem]> {
        match self {
            RlpItem::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Bytes of a text item. Malformed hex yields an empty string.
fn string_bytes(s: &str) -> Vec<u8> {
    let Some(digits) = s.strip_prefix("0x") else {
        return s.as_bytes().to_vec();
    };
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        padded.as_str()
    } else {
        digits
    };
    match hex::decode(digits) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(input = s, error = %e, "malformed hex in RLP string, encoding as empty string");
            Vec::new()
        }
    }
}

impl Encodable for RlpItem {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            RlpItem::Bytes(bytes) => {
                s.encoder().encode_value(bytes);
            }
            RlpItem::Str(text) => {
                s.encoder().encode_value(&string_bytes(text));
            }
            RlpItem::Uint(value) => {
                s.append(value);
            }
            RlpItem::List(items) => {
                s.begin_list(items.len());
                for item in items {
                    s.append(item);
                }
            }
        }
    }
}

impl Decodable for RlpItem {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.is_list() {
            Ok(RlpItem::List(rlp.as_list()?))
        } else {
            Ok(RlpItem::Bytes(rlp.data()?.to_vec()))
        }
    }
}

impl From<Vec<u8>> for RlpItem {
    fn from(v: Vec<u8>) -> Self {
        RlpItem::Bytes(v)
    }
}

impl From<&[u8]> for RlpItem {
    fn from(v: &[u8]) -> Self {
        RlpItem::Bytes(v.to_vec())
    }
}

impl From<&str> for RlpItem {
    fn from(v: &str) -> Self {
        RlpItem::Str(v.to_string())
    }
}

impl From<U256> for RlpItem {
    fn from(v: U256) -> Self {
        RlpItem::Uint(v)
    }
}

impl From<u64> for RlpItem {
    fn from(v: u64) -> Self {
        RlpItem::Uint(U256::from(v))
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(v: Vec<RlpItem>) -> Self {
        RlpItem::List(v)
    }
}

/// Encode an item tree to RLP bytes
pub fn encode_item(item: &RlpItem) -> Vec<u8> {
    rlp::encode(item).to_vec()
}

/// Encode a dynamic JSON value, with the permissive fallback of [`RlpItem::from_json`]
pub fn encode_json(value: &JsonValue) -> Vec<u8> {
    encode_item(&RlpItem::from_json(value))
}

/// Decode RLP bytes into an item tree; strings decode to [`RlpItem::Bytes`]
pub fn decode_item(data: &[u8]) -> Result<RlpItem, DecoderError> {
    rlp::decode(data)
}
