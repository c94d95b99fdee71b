//! Client configuration

use std::path::Path;
use std::time::Duration;

use ethkit_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::signer::{SignerError, Wallet};
use crate::SdkError;

/// Default JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// A funded development account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevAccount {
    /// Account address
    pub address: Address,
    /// Hex private key
    pub private_key: String,
}

impl DevAccount {
    /// Create an entry
    pub fn new(address: Address, private_key: impl Into<String>) -> Self {
        Self {
            address,
            private_key: private_key.into(),
        }
    }

    /// Wallet for this account's key
    pub fn wallet(&self) -> Result<Wallet, SignerError> {
        Wallet::from_private_key_hex(&self.private_key)
    }

    /// The first three accounts of a default local devnet (anvil / hardhat)
    pub fn anvil_defaults() -> Vec<DevAccount> {
        [
            (
                "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            ),
            (
                "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
            ),
            (
                "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
                "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
            ),
        ]
        .into_iter()
        .filter_map(|(address, key)| {
            Address::from_hex(address)
                .ok()
                .map(|address| DevAccount::new(address, key))
        })
        .collect()
    }
}

impl std::fmt::Debug for DevAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Chain the client signs for
    pub chain_id: u64,
    /// Delay between receipt polls
    pub polling_interval_ms: u64,
    /// Give up waiting for a receipt after this long
    pub receipt_timeout_ms: u64,
    /// Gas limit for deployments when none is given
    pub gas_limit: u64,
    /// Known development accounts
    pub accounts: Vec<DevAccount>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: 1337,
            polling_interval_ms: 500,
            receipt_timeout_ms: 60_000,
            gas_limit: 3_000_000,
            accounts: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Local devnet settings with the default dev accounts
    pub fn local() -> Self {
        Self {
            accounts: DevAccount::anvil_defaults(),
            ..Default::default()
        }
    }

    /// Parse TOML text
    pub fn from_toml_str(s: &str) -> Result<Self, SdkError> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, SdkError> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Polling interval as a duration
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// Receipt timeout as a duration
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    /// Account by position
    pub fn account(&self, index: usize) -> Option<&DevAccount> {
        self.accounts.get(index)
    }
}
