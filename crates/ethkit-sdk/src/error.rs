//! SDK error types

use std::time::Duration;

use ethkit_primitives::AddressError;
use thiserror::Error;

use crate::abi::AbiError;
use crate::signer::SignerError;
use crate::transport::TransportError;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// ABI parse, encode or decode failure
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// Transport/network error
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport {
        /// HTTP status, when the server answered
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// RPC error from node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Receipt not mined within the polling window
    #[error("Timed out after {}s waiting for receipt (limit {}s)", .elapsed.as_secs_f64(), .limit.as_secs_f64())]
    Timeout {
        /// Time spent polling
        elapsed: Duration,
        /// Configured limit
        limit: Duration,
    },

    /// Response had an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Signing failure
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    /// Contract deployment failure
    #[error("Deployment failed: {0}")]
    Deployment(String),

    /// Compiler collaborator failure
    #[error("Compiler error: {0}")]
    Compiler(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid chain ID
    #[error("Invalid chain ID: {0}")]
    InvalidChainId(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<TransportError> for SdkError {
    fn from(e: TransportError) -> Self {
        SdkError::Transport {
            status: e.status,
            message: e.message,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<ethkit_primitives::JsonError> for SdkError {
    fn from(e: ethkit_primitives::JsonError) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<ethkit_crypto::CryptoError> for SdkError {
    fn from(e: ethkit_crypto::CryptoError) -> Self {
        SdkError::Signer(SignerError::SigningFailed(e.to_string()))
    }
}
