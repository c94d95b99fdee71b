//! # ethkit-cli
//!
//! Command-line interface for the ethkit ABI codec and JSON-RPC client.
//!
//! ## Usage
//!
//! ```bash
//! # ABI commands (offline)
//! ethkit abi selector "transfer(address,uint256)"
//! ethkit abi encode --abi Token.json --function transfer --args '["0x...", 1000]'
//! ethkit abi decode --abi Token.json --function balanceOf --data 0x...
//! ethkit abi list --abi Token.json
//!
//! # RLP
//! ethkit rlp encode '["0x01", 2, []]'
//!
//! # Query commands
//! ethkit query chain-id
//! ethkit query nonce 0x...
//! ethkit query receipt 0x...
//!
//! # Transactions and deployment
//! ethkit tx send --from 0x... --to 0x... --value 1000
//! ethkit tx wait 0x... --timeout-ms 30000
//! ethkit deploy --bytecode 0x6080... --from 0x...
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ethkit_sdk::ClientConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use error::CliError;
pub use output::Output;

/// ethkit CLI
#[derive(Parser, Debug)]
#[command(name = "ethkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Config file (default: ~/.ethkit/config.toml)
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Encode and decode contract ABI data
    #[command(subcommand)]
    Abi(commands::abi::AbiCommand),
    /// RLP encoding
    #[command(subcommand)]
    Rlp(commands::rlp::RlpCommand),
    /// Query chain state
    #[command(subcommand)]
    Query(commands::query::QueryCommand),
    /// Transaction operations
    #[command(subcommand)]
    Tx(commands::tx::TxCommand),
    /// Deploy a contract
    Deploy(commands::deploy::DeployCommand),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set RPC URL
        #[arg(long)]
        set_rpc: Option<String>,
        /// Set chain ID
        #[arg(long)]
        set_chain_id: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli.command, cli.config_file.as_deref(), cli.rpc_url, cli.json).await {
        output::print_error(&e, cli.json);
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config_path: Option<&Path>,
    rpc_url: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut config = config::load(config_path)?;

    // Override RPC URL if provided
    if let Some(rpc_url) = rpc_url {
        config.rpc_url = rpc_url;
    }
    tracing::debug!("Using RPC endpoint {}", config.rpc_url);

    match command {
        Commands::Abi(cmd) => cmd.execute(json),
        Commands::Rlp(cmd) => cmd.execute(json),
        Commands::Query(cmd) => cmd.execute(&config, json).await,
        Commands::Tx(cmd) => cmd.execute(&config, json).await,
        Commands::Deploy(cmd) => cmd.execute(&config, json).await,
        Commands::Config {
            show,
            set_rpc,
            set_chain_id,
        } => handle_config(&mut config, config_path, show, set_rpc, set_chain_id, json),
    }
}

fn handle_config(
    config: &mut ClientConfig,
    config_path: Option<&Path>,
    show: bool,
    set_rpc: Option<String>,
    set_chain_id: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(rpc) = set_rpc {
        config.rpc_url = rpc;
        modified = true;
    }

    if let Some(chain_id) = set_chain_id {
        config.chain_id = chain_id;
        modified = true;
    }

    if modified {
        let path = config::save(config, config_path)?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &path.display().to_string())
            .message(&format!("Configuration saved to {}", path.display()))
            .print();
    } else if show {
        Output::new(json)
            .field("rpc_url", &config.rpc_url)
            .field_u64("chain_id", config.chain_id)
            .field_u64("gas_limit", config.gas_limit)
            .field_u64("polling_interval_ms", config.polling_interval_ms)
            .field_u64("receipt_timeout_ms", config.receipt_timeout_ms)
            .message(&format!(
                "RPC URL: {}\nChain ID: {}\nGas Limit: {}\nPolling: {} ms\nReceipt Timeout: {} ms",
                config.rpc_url,
                config.chain_id,
                config.gas_limit,
                config.polling_interval_ms,
                config.receipt_timeout_ms
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-rpc/--set-chain-id to modify")
            .print();
    }

    Ok(())
}
