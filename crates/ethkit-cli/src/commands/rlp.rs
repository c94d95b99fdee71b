//! RLP commands

use clap::Subcommand;
use ethkit_primitives::JsonValue;

use crate::{output::Output, CliError};

/// RLP subcommands
#[derive(Debug, Subcommand)]
pub enum RlpCommand {
    /// Encode a JSON value: strings, integers and nested arrays
    Encode {
        /// JSON text, e.g. '["0x01", 2, []]'
        value: String,
    },
}

impl RlpCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        match self {
            RlpCommand::Encode { value } => encode(&value, json),
        }
    }
}

fn encode(value: &str, json: bool) -> Result<(), CliError> {
    let parsed = JsonValue::from_str(value).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let encoded = format!("0x{}", hex::encode(ethkit_rlp::encode_json(&parsed)));

    Output::new(json)
        .field("encoded", &encoded)
        .message(&encoded)
        .print();

    Ok(())
}
