//! Transaction commands

use std::time::Duration;

use clap::Subcommand;
use ethkit_sdk::types::TransactionParams;
use ethkit_sdk::ClientConfig;

use super::{client, parse_address, parse_amount, parse_hex_bytes};
use crate::{output::Output, CliError};

/// Transaction subcommands
#[derive(Debug, Subcommand)]
pub enum TxCommand {
    /// Send a transaction signed by the node (eth_sendTransaction)
    Send {
        /// Sender address (must be unlocked on the node)
        #[arg(long)]
        from: String,
        /// Recipient address; omit for contract creation
        #[arg(long)]
        to: Option<String>,
        /// Value in wei (decimal or 0x hex)
        #[arg(long)]
        value: Option<String>,
        /// Call data as hex
        #[arg(long)]
        data: Option<String>,
        /// Gas limit
        #[arg(long)]
        gas: Option<u64>,
        /// Wait for the receipt before returning
        #[arg(long)]
        wait: bool,
    },
    /// Wait for a transaction to be mined
    Wait {
        /// Transaction hash
        hash: String,
        /// Delay between polls in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

impl TxCommand {
    pub async fn execute(self, config: &ClientConfig, json: bool) -> Result<(), CliError> {
        match self {
            TxCommand::Send {
                from,
                to,
                value,
                data,
                gas,
                wait,
            } => {
                let mut params = TransactionParams {
                    from: Some(parse_address(&from)?),
                    gas,
                    ..Default::default()
                };
                if let Some(to) = to {
                    params.to = Some(parse_address(&to)?);
                }
                if let Some(value) = value {
                    params.value = Some(parse_amount(&value)?);
                }
                if let Some(data) = data {
                    params.data = Some(parse_hex_bytes(&data)?);
                }
                send(config, &params, wait, json).await
            }
            TxCommand::Wait {
                hash,
                interval_ms,
                timeout_ms,
            } => {
                let interval = interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| config.polling_interval());
                let timeout = timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| config.receipt_timeout());
                wait_for(config, &hash, interval, timeout, json).await
            }
        }
    }
}

async fn send(config: &ClientConfig, params: &TransactionParams, wait: bool, json: bool) -> Result<(), CliError> {
    let client = client(config);
    let hash = client.send_transaction(params).await?;

    if !wait {
        Output::new(json)
            .field("hash", &hash)
            .message(&format!("Transaction sent: {}", hash))
            .print();
        return Ok(());
    }

    let receipt = client.wait_for_receipt_default(&hash).await?;
    let status = if receipt.is_successful() { "success" } else { "reverted" };
    Output::new(json)
        .field("hash", &hash)
        .field("status", status)
        .field_value("receipt", serde_json::to_value(&receipt)?)
        .message(&format!("Transaction {} mined: {}", hash, status))
        .print();

    Ok(())
}

async fn wait_for(
    config: &ClientConfig,
    hash: &str,
    interval: Duration,
    timeout: Duration,
    json: bool,
) -> Result<(), CliError> {
    let receipt = client(config).wait_for_receipt(hash, interval, timeout).await?;
    let status = if receipt.is_successful() { "success" } else { "reverted" };

    Output::new(json)
        .field("hash", hash)
        .field("status", status)
        .field_value("receipt", serde_json::to_value(&receipt)?)
        .message(&format!(
            "Transaction {} mined in block {}: {}",
            hash,
            receipt
                .block_number_u64()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            status
        ))
        .print();

    Ok(())
}
