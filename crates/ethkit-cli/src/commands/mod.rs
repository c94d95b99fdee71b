//! Subcommands and the argument parsing they share

pub mod abi;
pub mod deploy;
pub mod query;
pub mod rlp;
pub mod tx;

use std::path::Path;

use ethkit_primitives::{parse_quantity, Address, JsonValue, U256};
use ethkit_sdk::{AbiParser, AbiValue, ClientConfig, EthClient};

use crate::CliError;

/// HTTP client for the configured node
pub(crate) fn client(config: &ClientConfig) -> EthClient {
    EthClient::from_config(config.clone())
}

pub(crate) fn parse_address(s: &str) -> Result<Address, CliError> {
    Address::from_hex(s).map_err(|e| CliError::InvalidAddress(format!("{}: {}", s, e)))
}

pub(crate) fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, CliError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| CliError::InvalidHex(format!("{}: {}", s, e)))
}

/// Wei amount as decimal or `0x` hex
pub(crate) fn parse_amount(s: &str) -> Result<U256, CliError> {
    let parsed = if s.starts_with("0x") {
        parse_quantity(s)
    } else {
        U256::from_dec_str(s).ok()
    };
    parsed.ok_or_else(|| CliError::InvalidAmount(s.to_string()))
}

pub(crate) fn load_abi(path: &Path) -> Result<AbiParser, CliError> {
    Ok(AbiParser::from_file(path)?)
}

/// A JSON array of arguments
pub(crate) fn parse_args(json: &str) -> Result<Vec<AbiValue>, CliError> {
    let value = JsonValue::from_str(json).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| CliError::InvalidInput(format!("expected a JSON array of arguments, got {}", value.kind())))?;
    Ok(items.iter().map(AbiValue::from_json).collect::<Result<_, _>>()?)
}
