//! Query commands

use clap::Subcommand;
use ethkit_sdk::types::BlockId;
use ethkit_sdk::ClientConfig;

use super::{client, parse_address};
use crate::{output::Output, CliError};

/// Query subcommands
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Query chain ID
    ChainId,
    /// Query current gas price
    GasPrice,
    /// Query current block number
    BlockNumber,
    /// Query an account's transaction count
    Nonce {
        /// Account address
        address: String,
        /// Block tag or number
        #[arg(long, default_value = "latest")]
        block: String,
    },
    /// Query a transaction receipt
    Receipt {
        /// Transaction hash
        hash: String,
    },
}

impl QueryCommand {
    pub async fn execute(self, config: &ClientConfig, json: bool) -> Result<(), CliError> {
        match self {
            QueryCommand::ChainId => query_chain_id(config, json).await,
            QueryCommand::GasPrice => query_gas_price(config, json).await,
            QueryCommand::BlockNumber => query_block_number(config, json).await,
            QueryCommand::Nonce { address, block } => query_nonce(config, &address, &block, json).await,
            QueryCommand::Receipt { hash } => query_receipt(config, &hash, json).await,
        }
    }
}

pub(crate) fn parse_block(block: &str) -> Result<BlockId, CliError> {
    match block {
        "latest" => Ok(BlockId::Latest),
        "pending" => Ok(BlockId::Pending),
        "earliest" => Ok(BlockId::Earliest),
        "safe" => Ok(BlockId::Safe),
        "finalized" => Ok(BlockId::Finalized),
        other => other
            .parse::<u64>()
            .map(BlockId::Number)
            .map_err(|_| CliError::InvalidInput(format!("invalid block: {}", other))),
    }
}

async fn query_chain_id(config: &ClientConfig, json: bool) -> Result<(), CliError> {
    let chain_id = client(config).chain_id().await?;

    Output::new(json)
        .field_u64("chain_id", chain_id)
        .message(&format!("Chain ID: {}", chain_id))
        .print();

    Ok(())
}

async fn query_gas_price(config: &ClientConfig, json: bool) -> Result<(), CliError> {
    let gas_price = client(config).get_gas_price().await?;
    let gwei = gas_price / 1_000_000_000u64;

    Output::new(json)
        .field("gas_price", &gas_price.to_string())
        .message(&format!("Gas Price: {} wei ({} gwei)", gas_price, gwei))
        .print();

    Ok(())
}

async fn query_block_number(config: &ClientConfig, json: bool) -> Result<(), CliError> {
    let number = client(config).block_number().await?;

    Output::new(json)
        .field_u64("block_number", number)
        .message(&format!("Block Number: {}", number))
        .print();

    Ok(())
}

async fn query_nonce(config: &ClientConfig, address: &str, block: &str, json: bool) -> Result<(), CliError> {
    let address = parse_address(address)?;
    let block = parse_block(block)?;
    let nonce = client(config).get_transaction_count(&address, block).await?;

    Output::new(json)
        .field("address", address.value())
        .field_u64("nonce", nonce)
        .message(&format!("Nonce: {}", nonce))
        .print();

    Ok(())
}

async fn query_receipt(config: &ClientConfig, hash: &str, json: bool) -> Result<(), CliError> {
    match client(config).get_transaction_receipt(hash).await? {
        Some(receipt) => {
            let mut text = format!(
                "Transaction: {}\nStatus: {}\nBlock: {}\nGas Used: {}",
                receipt.transaction_hash,
                if receipt.is_successful() { "success" } else { "reverted" },
                receipt
                    .block_number_u64()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                receipt
                    .gas_used_u64()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
            if let Some(address) = &receipt.contract_address {
                text.push_str(&format!("\nContract: {}", address));
            }

            Output::new(json)
                .field_value("receipt", serde_json::to_value(&receipt)?)
                .message(&text)
                .print();
        }
        None => {
            Output::new(json)
                .field("hash", hash)
                .field("status", "pending")
                .message(&format!("Transaction {} is pending", hash))
                .print();
        }
    }

    Ok(())
}
