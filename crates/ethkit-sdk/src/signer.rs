//! Signing capability and its implementations

use ethkit_crypto::{keccak256, public_key_to_address, recover_address, sign, PrivateKey, PublicKey, Signature};
use ethkit_primitives::{Address, H256};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroize;

/// Signer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// Key material is not a valid secp256k1 scalar
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The account cannot perform this operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Underlying signing failure
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Hash a message with the `personal_sign` prefix
pub fn hash_message(message: &[u8]) -> H256 {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut data = prefix.into_bytes();
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Something that can sign 32-byte hashes for an address
pub trait Signer: Send + Sync {
    /// Account address
    fn address(&self) -> &Address;

    /// Sign a 32-byte hash; `v` is 27 or 28
    fn sign_hash(&self, hash: &H256) -> Result<Signature, SignerError>;

    /// Whether `signature` over `hash` was produced by `address`
    fn verify(&self, address: &Address, hash: &H256, signature: &Signature) -> Result<bool, SignerError>;

    /// Sign a message with Ethereum personal sign prefix
    fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.sign_hash(&hash_message(message))
    }
}

/// Wallet for managing private keys and signing
///
/// Note: Clone is intentionally not implemented to prevent accidental key duplication.
pub struct Wallet {
    private_key: PrivateKey,
    address: Address,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        let private_key = SigningKey::random(&mut OsRng);
        let address = public_key_to_address(private_key.verifying_key());

        Self {
            private_key,
            address,
        }
    }

    /// Create a wallet from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self, SignerError> {
        let private_key = SigningKey::from_slice(key)
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
        let address = public_key_to_address(private_key.verifying_key());

        Ok(Self {
            private_key,
            address,
        })
    }

    /// Create a wallet from a hex-encoded private key
    ///
    /// Accepts both with and without "0x" prefix.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, SignerError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes =
            hex::decode(hex).map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SignerError::InvalidPrivateKey(format!(
                "Expected 32 bytes, got {}",
                len
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Get the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.verifying_key()
    }
}

impl Signer for Wallet {
    fn address(&self) -> &Address {
        &self.address
    }

    fn sign_hash(&self, hash: &H256) -> Result<Signature, SignerError> {
        sign(hash, &self.private_key).map_err(|e| SignerError::SigningFailed(e.to_string()))
    }

    fn verify(&self, address: &Address, hash: &H256, signature: &Signature) -> Result<bool, SignerError> {
        if !signature.is_low_s() {
            return Ok(false);
        }
        Ok(recover_address(hash, signature)
            .map(|recovered| &recovered == address)
            .unwrap_or(false))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// An address without key material; every signing call fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyAccount {
    address: Address,
}

impl ReadOnlyAccount {
    /// Wrap an address
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Signer for ReadOnlyAccount {
    fn address(&self) -> &Address {
        &self.address
    }

    fn sign_hash(&self, _hash: &H256) -> Result<Signature, SignerError> {
        Err(SignerError::UnsupportedOperation(format!(
            "{} is read-only and cannot sign",
            self.address
        )))
    }

    fn verify(&self, _address: &Address, _hash: &H256, _signature: &Signature) -> Result<bool, SignerError> {
        Err(SignerError::UnsupportedOperation(format!(
            "{} is read-only and cannot verify",
            self.address
        )))
    }
}
