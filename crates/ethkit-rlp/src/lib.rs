//! # ethkit-rlp
//!
//! RLP (Recursive Length Prefix) encoding/decoding for ethkit.
//!
//! Built on the `rlp` crate's `RlpStream`, with [`RlpItem`] as the dynamic
//! value tree used for transaction payloads.
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

mod item;

use bytes::Bytes;

pub use item::{decode_item, encode_item, encode_json, RlpItem};

// Re-export rlp crate for direct use
pub use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Bytes {
    rlp::encode(value).freeze()
}

/// Decode RLP bytes to a value
pub fn decode<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    rlp::decode(data)
}
