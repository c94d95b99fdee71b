//! ABI errors

use thiserror::Error;

/// Error raised while parsing an ABI or encoding/decoding against it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    // ==================== Parsing ====================
    /// Malformed ABI JSON
    #[error("invalid ABI JSON: {0}")]
    InvalidJson(String),

    /// Required field absent from an ABI item
    #[error("missing field '{field}' in {item}")]
    MissingField {
        /// Field name
        field: String,
        /// Item kind
        item: String,
    },

    /// Item cast to the wrong kind
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Requested kind
        expected: String,
        /// Actual kind
        found: String,
    },

    /// Unrecognized `type` tag
    #[error("unknown ABI item type: {0}")]
    UnknownItemType(String),

    /// Reading the ABI source failed
    #[error("failed to read ABI: {0}")]
    Io(String),

    // ==================== Encoding ====================
    /// Wrong number of arguments
    #[error("argument count mismatch: expected {expected}, got {got}")]
    ArgumentCountMismatch {
        /// Declared inputs
        expected: usize,
        /// Supplied arguments
        got: usize,
    },

    /// Type string the codec does not know
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Value does not fit the declared type
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Address string with the wrong number of characters
    #[error("invalid address length: {0} hex characters")]
    InvalidAddressLength(usize),

    /// More bytes than a `bytesN` slot holds
    #[error("bytes{size} overflow: got {got} bytes")]
    FixedBytesOverflow {
        /// Declared N
        size: usize,
        /// Supplied length
        got: usize,
    },

    /// Structurally malformed type string or signature
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    // ==================== Decoding ====================
    /// Function declares no outputs
    #[error("function has no outputs to decode")]
    NoOutputs,

    /// Data shorter than the layout requires
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Data present but not decodable
    #[error("invalid data: {0}")]
    InvalidData(String),
}
