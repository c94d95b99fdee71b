//! Contract interaction helpers

use ethkit_primitives::Address;

use crate::abi::{AbiError, AbiFunction, AbiParser, AbiValue};

/// Standard ERC-20 interface
pub const ERC20_ABI: &str = r#"[
    {"type": "function", "name": "name", "inputs": [], "outputs": [{"name": "", "type": "string"}], "stateMutability": "view"},
    {"type": "function", "name": "symbol", "inputs": [], "outputs": [{"name": "", "type": "string"}], "stateMutability": "view"},
    {"type": "function", "name": "decimals", "inputs": [], "outputs": [{"name": "", "type": "uint8"}], "stateMutability": "view"},
    {"type": "function", "name": "totalSupply", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
    {"type": "function", "name": "balanceOf", "inputs": [{"name": "owner", "type": "address"}], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
    {"type": "function", "name": "transfer", "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}], "outputs": [{"name": "", "type": "bool"}], "stateMutability": "nonpayable"},
    {"type": "function", "name": "approve", "inputs": [{"name": "spender", "type": "address"}, {"name": "amount", "type": "uint256"}], "outputs": [{"name": "", "type": "bool"}], "stateMutability": "nonpayable"},
    {"type": "function", "name": "allowance", "inputs": [{"name": "owner", "type": "address"}, {"name": "spender", "type": "address"}], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
    {"type": "function", "name": "transferFrom", "inputs": [{"name": "from", "type": "address"}, {"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}], "outputs": [{"name": "", "type": "bool"}], "stateMutability": "nonpayable"},
    {"type": "event", "name": "Transfer", "inputs": [{"name": "from", "type": "address", "indexed": true}, {"name": "to", "type": "address", "indexed": true}, {"name": "value", "type": "uint256", "indexed": false}], "anonymous": false},
    {"type": "event", "name": "Approval", "inputs": [{"name": "owner", "type": "address", "indexed": true}, {"name": "spender", "type": "address", "indexed": true}, {"name": "value", "type": "uint256", "indexed": false}], "anonymous": false}
]"#;

/// A deployed contract: its address plus its ABI
#[derive(Debug, Clone)]
pub struct Contract {
    address: Address,
    abi: AbiParser,
}

impl Contract {
    /// Create a new contract helper
    pub fn new(address: Address, abi: AbiParser) -> Self {
        Self { address, abi }
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the ABI
    pub fn abi(&self) -> &AbiParser {
        &self.abi
    }

    /// Resolve `name` to the first overload taking `arity` arguments
    pub fn function(&self, name: &str, arity: usize) -> Result<&AbiFunction, AbiError> {
        self.abi.function_with_arity(name, arity)
    }

    /// Encode a function call as `0x` hex
    pub fn encode_call(&self, function_name: &str, args: &[AbiValue]) -> Result<String, AbiError> {
        self.function(function_name, args.len())?.encode_call(args)
    }

    /// Decode function output.
    ///
    /// Overloads are assumed to share outputs; the first one is used.
    pub fn decode_output(&self, function_name: &str, data: &str) -> Result<Vec<AbiValue>, AbiError> {
        let function = self.abi.function(function_name).into_iter().next().ok_or_else(|| {
            AbiError::MissingField {
                field: function_name.to_string(),
                item: "contract ABI".to_string(),
            }
        })?;
        function.decode_result(data)
    }
}

/// Create an ERC20 contract helper
pub fn erc20(address: Address) -> Result<Contract, AbiError> {
    Ok(Contract::new(address, AbiParser::from_json_str(ERC20_ABI)?))
}
