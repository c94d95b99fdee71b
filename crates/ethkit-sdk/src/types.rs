//! SDK types: JSON-RPC envelopes, transaction parameters and receipts

use ethkit_primitives::{parse_quantity, to_quantity, Address, JsonValue, H256, U256};
use serde::{Deserialize, Deserializer, Serialize};

/// JSON-RPC protocol version
pub const JSONRPC_VERSION: &str = "2.0";

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
    /// Safe block
    Safe,
    /// Finalized block
    Finalized,
}

impl BlockId {
    /// Tag or quantity as sent on the wire
    pub fn as_param(&self) -> String {
        match self {
            BlockId::Number(n) => format!("0x{:x}", n),
            BlockId::Latest => "latest".to_string(),
            BlockId::Pending => "pending".to_string(),
            BlockId::Earliest => "earliest".to_string(),
            BlockId::Safe => "safe".to_string(),
            BlockId::Finalized => "finalized".to_string(),
        }
    }
}

impl From<u64> for BlockId {
    fn from(n: u64) -> Self {
        BlockId::Number(n)
    }
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_param())
    }
}

/// Parameters for eth_sendTransaction, eth_call and eth_estimateGas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionParams {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer, omitted when zero
    pub value: Option<U256>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price (legacy)
    pub gas_price: Option<U256>,
    /// Max fee per gas (EIP-1559)
    pub max_fee_per_gas: Option<U256>,
    /// Max priority fee per gas (EIP-1559)
    pub max_priority_fee_per_gas: Option<U256>,
    /// Sender nonce
    pub nonce: Option<u64>,
    /// Input data
    pub data: Option<Vec<u8>>,
}

impl TransactionParams {
    /// Call or transfer to `to`
    pub fn to(to: Address) -> Self {
        Self {
            to: Some(to),
            ..Default::default()
        }
    }

    /// Attach input data
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the sender
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the value
    pub fn with_value(mut self, value: impl Into<U256>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the gas limit
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }
}

impl Serialize for TransactionParams {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let value = self.value.filter(|v| !v.is_zero());

        let count = [
            self.from.is_some(),
            self.to.is_some(),
            value.is_some(),
            self.gas.is_some(),
            self.gas_price.is_some(),
            self.max_fee_per_gas.is_some(),
            self.max_priority_fee_per_gas.is_some(),
            self.nonce.is_some(),
            self.data.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();

        let mut map = serializer.serialize_map(Some(count))?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(value) = &value {
            map.serialize_entry("value", &to_quantity(value))?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &to_quantity(gas_price))?;
        }
        if let Some(max_fee) = &self.max_fee_per_gas {
            map.serialize_entry("maxFeePerGas", &to_quantity(max_fee))?;
        }
        if let Some(max_priority) = &self.max_priority_fee_per_gas {
            map.serialize_entry("maxPriorityFeePerGas", &to_quantity(max_priority))?;
        }
        if let Some(nonce) = &self.nonce {
            map.serialize_entry("nonce", &format!("0x{:x}", nonce))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }

        map.end()
    }
}

/// Event log attached to a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics
    #[serde(default)]
    pub topics: Vec<H256>,
    /// Non-indexed data, hex
    #[serde(default)]
    pub data: String,
    /// Block number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    /// Transaction hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    /// Position in the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<String>,
}

impl Log {
    /// Decoded data bytes
    pub fn data_bytes(&self) -> Option<Vec<u8>> {
        hex::decode(self.data.strip_prefix("0x").unwrap_or(&self.data)).ok()
    }
}

/// Transaction receipt.
///
/// Quantities stay as the node sent them; use the accessors to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction hash
    pub transaction_hash: String,
    /// Block number
    #[serde(default)]
    pub block_number: Option<String>,
    /// Block hash
    #[serde(default)]
    pub block_hash: Option<String>,
    /// Position in the block
    #[serde(default)]
    pub transaction_index: Option<String>,
    /// `0x1` success, `0x0` reverted
    #[serde(default)]
    pub status: Option<String>,
    /// Gas used by this transaction
    #[serde(default)]
    pub gas_used: Option<String>,
    /// Gas used in the block up to and including this transaction
    #[serde(default)]
    pub cumulative_gas_used: Option<String>,
    /// Price paid per gas
    #[serde(default)]
    pub effective_gas_price: Option<String>,
    /// Sender
    #[serde(default)]
    pub from: Option<Address>,
    /// Recipient (None for creation)
    #[serde(default)]
    pub to: Option<Address>,
    /// Created contract
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Emitted logs
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Parse a receipt object
    pub fn from_json(value: &JsonValue) -> Result<Self, serde_json::Error> {
        let value = value
            .to_serde_value()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        serde_json::from_value(value)
    }

    /// Whether the transaction executed without reverting
    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }

    /// Parsed block number
    pub fn block_number_u64(&self) -> Option<u64> {
        quantity_u64(self.block_number.as_deref())
    }

    /// Parsed gas used
    pub fn gas_used_u64(&self) -> Option<u64> {
        quantity_u64(self.gas_used.as_deref())
    }
}

fn quantity_u64(s: Option<&str>) -> Option<u64> {
    let value = parse_quantity(s?)?;
    (value <= U256::from(u64::MAX)).then(|| value.low_u64())
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Request id
    pub id: u64,
    /// Method name
    pub method: String,
    /// Positional params
    pub params: Vec<JsonValue>,
}

impl RpcRequest {
    /// Create a request envelope
    pub fn new(id: u64, method: impl Into<String>, params: Vec<JsonValue>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC error member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Extra data (revert payloads and the like)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

/// JSON-RPC 2.0 response.
///
/// `result: null` deserializes to `Some(JsonValue::Null)`, distinct from an
/// absent `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol version
    #[serde(default)]
    pub jsonrpc: String,
    /// Id echoed from the request
    #[serde(default)]
    pub id: JsonValue,
    /// Success payload
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<JsonValue>,
    /// Failure payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonValue>, D::Error> {
    JsonValue::deserialize(deserializer).map(Some)
}

impl RpcResponse {
    /// Successful response
    pub fn success(id: u64, result: JsonValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: JsonValue::Int(id as i64),
            result: Some(result),
            error: None,
        }
    }

    /// Error response
    pub fn failure(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: JsonValue::Int(id as i64),
            result: None,
            error: Some(RpcErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Response carrying neither member
    pub fn empty(id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: JsonValue::Int(id as i64),
            result: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";

    #[test]
    fn test_block_id_serialize() {
        assert_eq!(serde_json::to_string(&BlockId::Latest).unwrap(), "\"latest\"");
        assert_eq!(serde_json::to_string(&BlockId::Number(100)).unwrap(), "\"0x64\"");
        assert_eq!(serde_json::to_string(&BlockId::Pending).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_params_omit_unset_fields() {
        let params = TransactionParams::to(Address::from_hex(ADDR).unwrap()).with_data(vec![0x01, 0x02]);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["to"], ADDR);
        assert_eq!(json["data"], "0x0102");
        assert!(json.get("from").is_none());
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_params_omit_zero_value_and_missing_to() {
        let params = TransactionParams {
            from: Some(Address::from_hex(ADDR).unwrap()),
            value: Some(U256::zero()),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("value").is_none());
        assert!(json.get("to").is_none());
        assert_eq!(json.as_object().unwrap().len(), 1);

        let params = params.with_value(1000u64).with_gas(21000);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["value"], "0x3e8");
        assert_eq!(json["gas"], "0x5208");
    }

    #[test]
    fn test_receipt_status() {
        let receipt = TransactionReceipt::from_json(
            &JsonValue::from_str(
                r#"{"transactionHash": "0xabc", "blockNumber": "0x10", "status": "0x1", "gasUsed": "0x5208", "logs": []}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert!(receipt.is_successful());
        assert_eq!(receipt.block_number_u64(), Some(16));
        assert_eq!(receipt.gas_used_u64(), Some(21000));
        assert!(receipt.contract_address.is_none());

        let reverted = TransactionReceipt {
            status: Some("0x0".to_string()),
            ..receipt
        };
        assert!(!reverted.is_successful());
    }

    #[test]
    fn test_response_null_result_is_present() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc": "2.0", "id": 1, "result": null}"#).unwrap();
        assert_eq!(resp.result, Some(JsonValue::Null));

        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc": "2.0", "id": 1}"#).unwrap();
        assert_eq!(resp.result, None);
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_response_error_member() {
        let resp: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "id": 7, "error": {"code": -32000, "message": "nonce too low"}}"#,
        )
        .unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "nonce too low");
    }

    #[test]
    fn test_request_envelope() {
        let req = RpcRequest::new(3, "eth_chainId", vec![]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 3);
        assert_eq!(json["method"], "eth_chainId");
        assert_eq!(json["params"], serde_json::json!([]));
    }
}
