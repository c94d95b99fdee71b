//! ECDSA signature operations using secp256k1

use ethkit_primitives::{Address, H256};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};

use crate::{keccak256, CryptoError};

/// Half of the secp256k1 curve order (n/2)
const SECP256K1_N_DIV_2: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D,
    0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Recoverable ECDSA signature, `v` stored as 27 or 28
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// 27 + recovery id
    pub v: u8,
}

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key
pub type PrivateKey = SigningKey;

impl Signature {
    /// Byte length of the packed `r || s || v` form
    pub const LEN: usize = 65;

    /// Create signature from r, s, v components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Recovery id (0 or 1); accepts both raw and 27-offset `v`
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// y-parity as used by typed transactions
    pub fn y_parity(&self) -> u8 {
        self.recovery_id() & 1
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Parse from a 65-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != Self::LEN {
            return Err(CryptoError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Signature { r, s, v: bytes[64] })
    }

    /// `0x`-prefixed hex of the packed form
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Check if signature has low-s value (EIP-2)
    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_N_DIV_2
    }

    fn to_k256(&self) -> Result<K256Signature, CryptoError> {
        let r: k256::FieldBytes = self.r.into();
        let s: k256::FieldBytes = self.s.into();
        K256Signature::from_scalars(r, s).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

/// Sign a 32-byte prehash, normalizing to low-s
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => {
            let flipped = RecoveryId::from_byte(recovery_id.to_byte() ^ 1).ok_or_else(|| {
                CryptoError::SigningFailed("recovery id out of range after normalization".into())
            })?;
            (normalized, flipped)
        }
        None => (signature, recovery_id),
    };

    Ok(Signature {
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
        v: recovery_id.to_byte() + 27,
    })
}

/// Verify a signature against a message hash and public key.
///
/// High-s signatures are rejected.
pub fn verify(
    message_hash: &H256,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    if !signature.is_low_s() {
        return Ok(false);
    }
    let k256_sig = signature.to_k256()?;
    Ok(public_key
        .verify_prehash(message_hash.as_bytes(), &k256_sig)
        .is_ok())
}

/// Recover public key from signature and message hash
pub fn recover_public_key(
    message_hash: &H256,
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let k256_sig = signature.to_k256()?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or(CryptoError::InvalidRecoveryId(signature.v))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Recover the signing address
pub fn recover_address(message_hash: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    recover_public_key(message_hash, signature).map(|key| public_key_to_address(&key))
}

/// Derive address from public key: last 20 bytes of keccak(x || y)
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn dev_key() -> PrivateKey {
        SigningKey::from_slice(&hex::decode(DEV_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_known_key_address() {
        let key = dev_key();
        let address = public_key_to_address(key.verifying_key());
        assert_eq!(address.to_lower_hex(), DEV_ADDRESS);
    }

    #[test]
    fn test_sign_and_verify() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"test message");

        let signature = sign(&message_hash, &private_key).unwrap();
        assert!(signature.is_low_s());
        assert!(signature.v == 27 || signature.v == 28);
        assert!(verify(&message_hash, &signature, private_key.verifying_key()).unwrap());
    }

    #[test]
    fn test_recover_address() {
        let key = dev_key();
        let message_hash = keccak256(b"recover me");
        let signature = sign(&message_hash, &key).unwrap();

        let recovered = recover_address(&message_hash, &signature).unwrap();
        assert_eq!(recovered.to_lower_hex(), DEV_ADDRESS);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = dev_key();
        let message_hash = keccak256(b"rfc6979");
        assert_eq!(
            sign(&message_hash, &key).unwrap(),
            sign(&message_hash, &key).unwrap()
        );
    }

    #[test]
    fn test_reject_high_s_signature() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"test");

        let mut signature = sign(&message_hash, &private_key).unwrap();
        signature.s = [0xFF; 32];
        assert!(!verify(&message_hash, &signature, private_key.verifying_key()).unwrap());
    }

    #[test]
    fn test_packed_roundtrip() {
        let signature = sign(&keccak256(b"pack"), &dev_key()).unwrap();
        let bytes = signature.to_bytes();
        assert_eq!(Signature::from_slice(&bytes).unwrap(), signature);
        assert!(Signature::from_slice(&bytes[..64]).is_err());
        assert_eq!(signature.to_hex().len(), 2 + 130);
    }

    #[test]
    fn test_invalid_recovery_id() {
        let mut signature = sign(&keccak256(b"v"), &dev_key()).unwrap();
        signature.v = 35;
        assert!(matches!(
            recover_public_key(&keccak256(b"v"), &signature),
            Err(CryptoError::InvalidRecoveryId(35))
        ));
    }
}
