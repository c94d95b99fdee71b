//! Deploy command

use std::path::PathBuf;

use clap::Args;
use ethkit_sdk::{ClientConfig, DeployRequest, Deployer};

use super::{client, load_abi, parse_address, parse_amount, parse_args};
use crate::{output::Output, CliError};

/// Deploy contract bytecode through a node-managed account
#[derive(Debug, Args)]
pub struct DeployCommand {
    /// Init bytecode as hex
    #[arg(long)]
    bytecode: String,
    /// Sender address (must be unlocked on the node)
    #[arg(long)]
    from: String,
    /// ABI JSON file, used to encode constructor arguments
    #[arg(long)]
    abi: Option<PathBuf>,
    /// Constructor arguments as a JSON array
    #[arg(long, requires = "abi")]
    args: Option<String>,
    /// Gas limit
    #[arg(long)]
    gas: Option<u64>,
    /// Endowment in wei
    #[arg(long)]
    value: Option<String>,
}

impl DeployCommand {
    pub async fn execute(self, config: &ClientConfig, json: bool) -> Result<(), CliError> {
        let mut request = DeployRequest::bytecode(self.bytecode, parse_address(&self.from)?);
        request.gas = self.gas;
        if let Some(value) = &self.value {
            request.value = parse_amount(value)?;
        }

        if let Some(path) = &self.abi {
            let abi = load_abi(path)?;
            let args = match &self.args {
                Some(args) => parse_args(args)?,
                None => Vec::new(),
            };
            if let Some(constructor) = abi.constructor() {
                request = request.with_constructor(constructor.clone(), args);
            } else {
                request = request.with_args(args);
            }
        }

        let client = client(config);
        let deployment = Deployer::new(&client).deploy(&request).await?;

        Output::new(json)
            .field("address", deployment.address.value())
            .field("hash", &deployment.transaction_hash)
            .message(&format!(
                "Contract deployed at {}\nTransaction: {}",
                deployment.address, deployment.transaction_hash
            ))
            .print();

        Ok(())
    }
}
