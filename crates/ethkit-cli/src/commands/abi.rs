//! ABI commands (offline)

use std::path::PathBuf;

use clap::Subcommand;
use ethkit_sdk::abi::AbiItem;
use ethkit_sdk::{AbiError, AbiValue};
use serde_json::Value;

use super::{load_abi, parse_args};
use crate::{output::Output, CliError};

/// ABI subcommands
#[derive(Debug, Subcommand)]
pub enum AbiCommand {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// Canonical signature, e.g. "transfer(address,uint256)"
        signature: String,
    },
    /// Encode call data for a function
    Encode {
        /// ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Function name
        #[arg(long)]
        function: String,
        /// Arguments as a JSON array
        #[arg(long, default_value = "[]")]
        args: String,
    },
    /// Decode a function's return data
    Decode {
        /// ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Function name
        #[arg(long)]
        function: String,
        /// Return data as hex
        #[arg(long)]
        data: String,
    },
    /// List the items of an ABI
    List {
        /// ABI JSON file
        #[arg(long)]
        abi: PathBuf,
    },
}

impl AbiCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        match self {
            AbiCommand::Selector { signature } => selector(&signature, json),
            AbiCommand::Encode {
                abi,
                function,
                args,
            } => encode(&abi, &function, &args, json),
            AbiCommand::Decode {
                abi,
                function,
                data,
            } => decode(&abi, &function, &data, json),
            AbiCommand::List { abi } => list(&abi, json),
        }
    }
}

fn selector(signature: &str, json: bool) -> Result<(), CliError> {
    let signature: String = signature.chars().filter(|c| !c.is_whitespace()).collect();
    let selector = format!("0x{}", hex::encode(ethkit_crypto::selector(&signature)));

    Output::new(json)
        .field("signature", &signature)
        .field("selector", &selector)
        .message(&selector)
        .print();

    Ok(())
}

fn encode(path: &std::path::Path, name: &str, args: &str, json: bool) -> Result<(), CliError> {
    let abi = load_abi(path)?;
    let args = parse_args(args)?;
    let function = abi.function_with_arity(name, args.len())?;
    let data = function.encode_call(&args)?;

    Output::new(json)
        .field("function", &function.signature()?)
        .field("data", &data)
        .message(&data)
        .print();

    Ok(())
}

fn decode(path: &std::path::Path, name: &str, data: &str, json: bool) -> Result<(), CliError> {
    let abi = load_abi(path)?;
    let function = abi
        .function(name)
        .into_iter()
        .next()
        .ok_or_else(|| AbiError::MissingField {
            field: name.to_string(),
            item: "contract ABI".to_string(),
        })?;
    let values = function.decode_result(data)?;

    let rendered: Vec<Value> = values
        .iter()
        .map(|v| AbiValue::to_json(v).to_serde_value())
        .collect::<Result<_, _>>()
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let text = rendered
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    Output::new(json)
        .field("function", &function.signature()?)
        .field_value("values", Value::Array(rendered))
        .message(&text)
        .print();

    Ok(())
}

fn list(path: &std::path::Path, json: bool) -> Result<(), CliError> {
    let abi = load_abi(path)?;

    let mut entries = Vec::new();
    let mut lines = Vec::new();
    for item in abi.items() {
        let (signature, id) = match item {
            AbiItem::Function(f) => (f.signature()?, Some(format!("0x{}", hex::encode(f.selector()?)))),
            AbiItem::Event(e) => (e.signature()?, Some(e.topic()?.to_hex())),
            AbiItem::Error(e) => (e.signature()?, Some(format!("0x{}", hex::encode(e.selector()?)))),
            AbiItem::Constructor(c) => {
                let types = c
                    .inputs
                    .iter()
                    .map(|p| p.canonical_type())
                    .collect::<Result<Vec<_>, _>>()?;
                (format!("constructor({})", types.join(",")), None)
            }
            AbiItem::Fallback(_) => ("fallback()".to_string(), None),
            AbiItem::Receive(_) => ("receive()".to_string(), None),
        };

        lines.push(match &id {
            Some(id) => format!("{:<12} {}  {}", item.kind(), id, signature),
            None => format!("{:<12} {}", item.kind(), signature),
        });
        entries.push(serde_json::json!({
            "kind": item.kind(),
            "signature": signature,
            "id": id,
        }));
    }

    Output::new(json)
        .field_u64("count", entries.len() as u64)
        .field_value("items", Value::Array(entries))
        .message(&lines.join("\n"))
        .print();

    Ok(())
}
