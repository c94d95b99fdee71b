//! # ethkit-sdk
//!
//! Solidity ABI codec and JSON-RPC transaction client for Ethereum-compatible nodes.
//!
//! ## Features
//!
//! - **ABI**: parse contract ABI JSON, encode calls and constructor arguments,
//!   decode return data
//! - **EthClient**: JSON-RPC client with receipt polling
//! - **Wallet**: local secp256k1 signing
//! - **TxBuilder**: legacy (EIP-155) and EIP-1559 transactions
//! - **Deployer**: compile-or-bytecode contract deployment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ethkit_sdk::{Address, EthClient, TxBuilder, Wallet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EthClient::connect("http://localhost:8545");
//!     let wallet = Wallet::new_random();
//!
//!     let to = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d")?;
//!     let tx = TxBuilder::new(0).to(to).value(1_000_000_000_000_000u64);
//!
//!     let hash = client.send_signed(tx, &wallet).await?;
//!     let receipt = client.wait_for_receipt_default(&hash).await?;
//!     println!("mined in block {:?}", receipt.block_number_u64());
//!     Ok(())
//! }
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust,no_run
//! use ethkit_sdk::{contract, Address, AbiValue, EthClient};
//! use ethkit_sdk::types::{BlockId, TransactionParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EthClient::new_mock();
//!
//!     let token = Address::from_hex("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")?;
//!     let erc20 = contract::erc20(token.clone())?;
//!
//!     let owner = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";
//!     let data = erc20.encode_call("balanceOf", &[AbiValue::from(owner)])?;
//!
//!     let params = TransactionParams::to(token).with_data(hex::decode(&data[2..])?);
//!     let result = client.call(&params, BlockId::Latest).await?;
//!     let values = erc20.decode_output("balanceOf", &result)?;
//!     println!("balance: {:?}", values[0]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod client;
mod clock;
pub mod compiler;
mod config;
pub mod contract;
pub mod deploy;
mod error;
mod signer;
mod transport;
mod tx_builder;
pub mod types;

// Re-export main types
pub use abi::{AbiError, AbiParser, AbiValue};
pub use client::EthClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use compiler::{Compiler, CompilerInput, CompilerOutput, ImportError, ImportResolver};
pub use config::{ClientConfig, DevAccount, DEFAULT_RPC_URL};
pub use deploy::{Deployer, DeployRequest, Deployment};
pub use error::SdkError;
pub use signer::{hash_message, ReadOnlyAccount, Signer, SignerError, Wallet};
pub use transport::{MockReply, MockTransport, TransportError};
pub use tx_builder::{
    AccessListItem, Eip1559Transaction, LegacyTransaction, SignedTransaction, TxBuilder,
    EIP1559_TX_TYPE,
};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use ethkit_primitives::{Address, JsonValue, H256, I256, U256};
