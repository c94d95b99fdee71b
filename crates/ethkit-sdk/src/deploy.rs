//! Contract deployment
//!
//! Init code comes either as ready bytecode or from a [`Compiler`]. Compiler
//! diagnostics and missing artifacts are caught before anything is sent.

use std::time::Duration;

use ethkit_primitives::{Address, U256};
use tracing::{debug, info};

use crate::abi::{encode_constructor, AbiConstructor, AbiParser, AbiValue};
use crate::client::EthClient;
use crate::compiler::{Compiler, CompilerInput, ImportResolver};
use crate::contract::Contract;
use crate::signer::Signer;
use crate::tx_builder::TxBuilder;
use crate::types::{TransactionParams, TransactionReceipt};
use crate::SdkError;

/// Where the init code comes from
#[derive(Debug, Clone)]
pub enum BytecodeSource {
    /// Hex bytecode, `0x` optional
    Bytecode(String),
    /// Compile `contract_name` out of `input`
    Source {
        /// Compiler input
        input: CompilerInput,
        /// Contract to deploy
        contract_name: String,
    },
}

/// What to deploy and how
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Init code
    pub source: BytecodeSource,
    /// Constructor used to encode `args`; taken from the compiled ABI when unset
    pub constructor: Option<AbiConstructor>,
    /// Constructor arguments
    pub args: Vec<AbiValue>,
    /// Sender
    pub from: Address,
    /// Gas limit, config default when unset
    pub gas: Option<u64>,
    /// Endowment
    pub value: U256,
}

impl DeployRequest {
    /// Deploy ready bytecode from `from`
    pub fn bytecode(bytecode: impl Into<String>, from: Address) -> Self {
        Self {
            source: BytecodeSource::Bytecode(bytecode.into()),
            constructor: None,
            args: Vec::new(),
            from,
            gas: None,
            value: U256::zero(),
        }
    }

    /// Compile and deploy `contract_name`
    pub fn source(input: CompilerInput, contract_name: impl Into<String>, from: Address) -> Self {
        Self {
            source: BytecodeSource::Source {
                input,
                contract_name: contract_name.into(),
            },
            ..Self::bytecode(String::new(), from)
        }
    }

    /// Set constructor and arguments
    pub fn with_constructor(mut self, constructor: AbiConstructor, args: Vec<AbiValue>) -> Self {
        self.constructor = Some(constructor);
        self.args = args;
        self
    }

    /// Set constructor arguments
    pub fn with_args(mut self, args: Vec<AbiValue>) -> Self {
        self.args = args;
        self
    }

    /// Set gas limit
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Set endowment
    pub fn with_value(mut self, value: impl Into<U256>) -> Self {
        self.value = value.into();
        self
    }
}

/// Creation data ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDeployment {
    /// Init code with encoded constructor arguments appended
    pub data: Vec<u8>,
    /// ABI of the contract, when known
    pub abi: Option<AbiParser>,
}

/// A mined deployment
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Created contract
    pub address: Address,
    /// Creation transaction
    pub transaction_hash: String,
    /// Creation receipt
    pub receipt: TransactionReceipt,
    /// ABI of the contract, when known
    pub abi: Option<AbiParser>,
}

impl Deployment {
    /// Contract helper bound to the new address
    pub fn contract(&self) -> Option<Contract> {
        self.abi
            .as_ref()
            .map(|abi| Contract::new(self.address.clone(), abi.clone()))
    }
}

/// Deploys contracts through an [`EthClient`]
pub struct Deployer<'a> {
    client: &'a EthClient,
    compiler: Option<&'a dyn Compiler>,
    resolver: Option<&'a dyn ImportResolver>,
    signer: Option<&'a dyn Signer>,
    polling_interval: Duration,
    timeout: Duration,
}

impl<'a> Deployer<'a> {
    /// Node-signed deployments with the client's polling settings
    pub fn new(client: &'a EthClient) -> Self {
        Self {
            client,
            compiler: None,
            resolver: None,
            signer: None,
            polling_interval: client.config().polling_interval(),
            timeout: client.config().receipt_timeout(),
        }
    }

    /// Compile sources with `compiler`
    pub fn with_compiler(mut self, compiler: &'a dyn Compiler) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Resolve imports with `resolver`
    pub fn with_resolver(mut self, resolver: &'a dyn ImportResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sign locally instead of through `eth_sendTransaction`
    pub fn with_signer(mut self, signer: &'a dyn Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Override receipt polling
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.polling_interval = interval;
        self.timeout = timeout;
        self
    }

    /// Build creation data without touching the network
    pub async fn prepare(&self, request: &DeployRequest) -> Result<PreparedDeployment, SdkError> {
        let (bytecode, abi) = match &request.source {
            BytecodeSource::Bytecode(hex) => (decode_bytecode(hex)?, None),
            BytecodeSource::Source {
                input,
                contract_name,
            } => {
                let compiler = self.compiler.ok_or_else(|| {
                    SdkError::Deployment(format!("no compiler configured to build {}", contract_name))
                })?;
                let output = compiler.compile(input, self.resolver).await?;

                let errors = output.error_diagnostics();
                if !errors.is_empty() {
                    let messages: Vec<&str> = errors
                        .iter()
                        .map(|d| d.formatted_message.as_deref().unwrap_or(&d.message))
                        .collect();
                    return Err(SdkError::Deployment(format!(
                        "compilation failed: {}",
                        messages.join("; ")
                    )));
                }

                let contract = output.contract(contract_name).ok_or_else(|| {
                    SdkError::Deployment(format!("contract {} not found in compiler output", contract_name))
                })?;
                (decode_bytecode(&contract.bytecode)?, Some(contract.abi.clone()))
            }
        };

        if bytecode.is_empty() {
            return Err(SdkError::Deployment("empty bytecode".to_string()));
        }

        let constructor = request
            .constructor
            .clone()
            .or_else(|| abi.as_ref().and_then(|abi| abi.constructor().cloned()));

        let mut data = bytecode;
        match constructor {
            Some(constructor) => data.extend(encode_constructor(&constructor, &request.args)?),
            None if !request.args.is_empty() => {
                return Err(SdkError::Deployment(format!(
                    "{} constructor arguments given but no constructor is known",
                    request.args.len()
                )));
            }
            None => {}
        }

        Ok(PreparedDeployment { data, abi })
    }

    /// Prepare, send and wait for the creation receipt
    pub async fn deploy(&self, request: &DeployRequest) -> Result<Deployment, SdkError> {
        let prepared = self.prepare(request).await?;
        let gas = request.gas.unwrap_or(self.client.config().gas_limit);
        debug!(from = %request.from, gas, size = prepared.data.len(), "deploying contract");

        let transaction_hash = match self.signer {
            Some(signer) => {
                let builder = TxBuilder::new(0)
                    .gas_limit(gas)
                    .value(request.value)
                    .data(prepared.data);
                self.client.send_signed(builder, signer).await?
            }
            None => {
                let params = TransactionParams {
                    from: Some(request.from.clone()),
                    gas: Some(gas),
                    value: Some(request.value),
                    data: Some(prepared.data),
                    ..Default::default()
                };
                self.client.send_transaction(&params).await?
            }
        };

        let receipt = self
            .client
            .wait_for_receipt(&transaction_hash, self.polling_interval, self.timeout)
            .await?;

        if receipt.status.as_deref() == Some("0x0") {
            return Err(SdkError::Deployment(format!(
                "transaction {} reverted",
                transaction_hash
            )));
        }
        let address = receipt.contract_address.clone().ok_or_else(|| {
            SdkError::Deployment(format!(
                "receipt for {} has no contract address",
                transaction_hash
            ))
        })?;

        info!(address = %address, hash = %transaction_hash, "contract deployed");
        Ok(Deployment {
            address,
            transaction_hash,
            receipt,
            abi: prepared.abi,
        })
    }
}

fn decode_bytecode(hex_str: &str) -> Result<Vec<u8>, SdkError> {
    let hex_str = hex_str.trim();
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(stripped).map_err(|e| SdkError::Deployment(format!("invalid bytecode: {}", e)))
}
