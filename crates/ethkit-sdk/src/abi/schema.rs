//! ABI item model
//!
//! One struct per item kind. Items deserialize from the compiler's JSON form
//! and serialize back to it with a `type` tag.

use ethkit_crypto::{keccak256, selector};
use ethkit_primitives::{JsonValue, H256};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::decode::{decode_params, decode_word};
use super::encode::{encode_call, encode_constructor};
use super::error::AbiError;
use super::types::{AbiValue, ParamType, TypeCategory};

/// Function parameter, event field or tuple component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParameter {
    /// Parameter name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Solidity type string
    #[serde(rename = "type")]
    pub ty: String,
    /// Indexed flag (events only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    /// Members of a `tuple` / `tuple[]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<AbiParameter>>,
    /// Compiler-side type name, informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl AbiParameter {
    /// Create an unnamed-by-default parameter
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            indexed: None,
            components: None,
            internal_type: None,
        }
    }

    /// Parsed type, resolving `tuple` against the components
    pub fn param_type(&self) -> Result<ParamType, AbiError> {
        ParamType::parse_with(self.ty.trim(), self.components.as_deref())
    }

    /// Canonical type string used in signatures
    pub fn canonical_type(&self) -> Result<String, AbiError> {
        self.param_type().map(|t| t.canonical())
    }

    /// Whether the field is an indexed event topic
    pub fn is_indexed(&self) -> bool {
        self.indexed.unwrap_or(false)
    }
}

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads nothing
    Pure,
    /// Reads state
    View,
    /// Writes state
    #[default]
    Nonpayable,
    /// Writes state and accepts value
    Payable,
}

/// `function` item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiFunction {
    /// Function name
    pub name: String,
    /// Inputs
    pub inputs: Vec<AbiParameter>,
    /// Outputs
    #[serde(default)]
    pub outputs: Vec<AbiParameter>,
    /// Mutability
    pub state_mutability: StateMutability,
    /// Legacy `constant` flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    /// Legacy `payable` flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

/// `constructor` item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiConstructor {
    /// Inputs
    pub inputs: Vec<AbiParameter>,
    /// Mutability
    #[serde(default)]
    pub state_mutability: StateMutability,
    /// Legacy `payable` flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

/// `fallback` item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiFallback {
    /// Mutability
    #[serde(default)]
    pub state_mutability: StateMutability,
}

/// `receive` item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiReceive {
    /// Mutability (always payable for well-formed ABIs)
    #[serde(default = "payable")]
    pub state_mutability: StateMutability,
}

fn payable() -> StateMutability {
    StateMutability::Payable
}

/// `event` item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEvent {
    /// Event name
    pub name: String,
    /// Fields
    #[serde(default)]
    pub inputs: Vec<AbiParameter>,
    /// Anonymous events carry no signature topic
    #[serde(default)]
    pub anonymous: bool,
}

/// `error` item (custom revert error)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiErrorDef {
    /// Error name
    pub name: String,
    /// Fields
    #[serde(default)]
    pub inputs: Vec<AbiParameter>,
}

/// One entry of a contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    /// `function`
    Function(AbiFunction),
    /// `constructor`
    Constructor(AbiConstructor),
    /// `fallback`
    Fallback(AbiFallback),
    /// `receive`
    Receive(AbiReceive),
    /// `event`
    Event(AbiEvent),
    /// `error`
    Error(AbiErrorDef),
}

fn signature_of(name: &str, params: &[AbiParameter]) -> Result<String, AbiError> {
    let types = params
        .iter()
        .map(AbiParameter::canonical_type)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{}({})", name, types.join(",")))
}

fn param_types(params: &[AbiParameter]) -> Result<Vec<ParamType>, AbiError> {
    params.iter().map(AbiParameter::param_type).collect()
}

/// The `type` tag of a raw item; absent means `function`
fn item_type(value: &serde_json::Value) -> Result<&str, AbiError> {
    let obj = value
        .as_object()
        .ok_or_else(|| AbiError::InvalidJson("ABI entry is not an object".to_string()))?;
    match obj.get("type") {
        None => Ok("function"),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(other) => Err(AbiError::InvalidJson(format!(
            "ABI entry type must be a string, got {}",
            other
        ))),
    }
}

/// Check the kind tag and required fields, then deserialize
fn decode_kind<T: DeserializeOwned>(
    value: &serde_json::Value,
    kind: &str,
    required: &[&str],
) -> Result<T, AbiError> {
    let found = item_type(value)?;
    if found != kind {
        return Err(AbiError::TypeMismatch {
            expected: kind.to_string(),
            found: found.to_string(),
        });
    }
    for field in required {
        if value.get(*field).is_none() {
            return Err(AbiError::MissingField {
                field: field.to_string(),
                item: kind.to_string(),
            });
        }
    }
    serde_json::from_value(value.clone()).map_err(|e| AbiError::InvalidJson(format!("{}: {}", kind, e)))
}

fn to_serde(value: &JsonValue) -> Result<serde_json::Value, AbiError> {
    value
        .to_serde_value()
        .map_err(|e| AbiError::InvalidJson(e.to_string()))
}

impl AbiFunction {
    /// Parse a `function` entry
    pub fn from_json(value: &JsonValue) -> Result<Self, AbiError> {
        decode_kind(&to_serde(value)?, "function", &["name", "inputs", "stateMutability"])
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> Result<String, AbiError> {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte selector
    pub fn selector(&self) -> Result<[u8; 4], AbiError> {
        Ok(selector(&self.signature()?))
    }

    /// Parsed input types
    pub fn input_types(&self) -> Result<Vec<ParamType>, AbiError> {
        param_types(&self.inputs)
    }

    /// Parsed output types
    pub fn output_types(&self) -> Result<Vec<ParamType>, AbiError> {
        param_types(&self.outputs)
    }

    /// `view` or `pure`
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    /// Encode call data as a `0x` hex string
    pub fn encode_call(&self, args: &[AbiValue]) -> Result<String, AbiError> {
        encode_call(self, args)
    }

    /// Decode a hex return value against the outputs
    pub fn decode_result(&self, data: &str) -> Result<Vec<AbiValue>, AbiError> {
        super::decode::decode_result(self, data)
    }
}

impl AbiConstructor {
    /// Parse a `constructor` entry
    pub fn from_json(value: &JsonValue) -> Result<Self, AbiError> {
        decode_kind(&to_serde(value)?, "constructor", &["inputs"])
    }

    /// Parsed input types
    pub fn input_types(&self) -> Result<Vec<ParamType>, AbiError> {
        param_types(&self.inputs)
    }

    /// Encode constructor arguments (no selector)
    pub fn encode_args(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        encode_constructor(self, args)
    }
}

impl AbiEvent {
    /// Parse an `event` entry
    pub fn from_json(value: &JsonValue) -> Result<Self, AbiError> {
        decode_kind(&to_serde(value)?, "event", &["name"])
    }

    /// Canonical signature
    pub fn signature(&self) -> Result<String, AbiError> {
        signature_of(&self.name, &self.inputs)
    }

    /// Signature topic (keccak of the signature)
    pub fn topic(&self) -> Result<H256, AbiError> {
        Ok(keccak256(self.signature()?.as_bytes()))
    }

    /// Decode a log into named fields.
    ///
    /// Indexed static fields come from the topics; indexed dynamic fields
    /// only carry their hash and decode to the raw 32 bytes.
    pub fn decode_log(
        &self,
        topics: &[H256],
        data: &[u8],
    ) -> Result<IndexMap<String, AbiValue>, AbiError> {
        let mut topics = topics.iter();
        if !self.anonymous {
            let first = topics
                .next()
                .ok_or_else(|| AbiError::InsufficientData("log has no topics".to_string()))?;
            if *first != self.topic()? {
                return Err(AbiError::InvalidData(format!(
                    "topic does not match {}",
                    self.signature()?
                )));
            }
        }

        let data_types = self
            .inputs
            .iter()
            .filter(|p| !p.is_indexed())
            .map(AbiParameter::param_type)
            .collect::<Result<Vec<_>, _>>()?;
        let mut data_values = decode_params(&data_types, data)?.into_iter();

        let mut fields = IndexMap::with_capacity(self.inputs.len());
        for (i, input) in self.inputs.iter().enumerate() {
            let key = if input.name.is_empty() {
                i.to_string()
            } else {
                input.name.clone()
            };
            let value = if input.is_indexed() {
                let topic = topics.next().ok_or_else(|| {
                    AbiError::InsufficientData(format!("missing topic for {}", key))
                })?;
                let ty = input.param_type()?;
                if ty.category() == TypeCategory::StaticScalar {
                    decode_word(&ty, topic.as_bytes())
                } else {
                    AbiValue::Bytes(topic.as_bytes().to_vec())
                }
            } else {
                data_values
                    .next()
                    .ok_or_else(|| AbiError::InvalidData(format!("missing data for {}", key)))?
            };
            fields.insert(key, value);
        }
        Ok(fields)
    }
}

impl AbiErrorDef {
    /// Parse an `error` entry
    pub fn from_json(value: &JsonValue) -> Result<Self, AbiError> {
        decode_kind(&to_serde(value)?, "error", &["name"])
    }

    /// Canonical signature
    pub fn signature(&self) -> Result<String, AbiError> {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte selector prefixing the revert data
    pub fn selector(&self) -> Result<[u8; 4], AbiError> {
        Ok(selector(&self.signature()?))
    }

    /// Decode revert data (selector included)
    pub fn decode(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::InsufficientData(format!(
                "revert data is {} bytes, selector needs 4",
                data.len()
            )));
        }
        if data[..4] != self.selector()? {
            return Err(AbiError::InvalidData(format!(
                "selector does not match {}",
                self.signature()?
            )));
        }
        decode_params(&param_types(&self.inputs)?, &data[4..])
    }
}

impl AbiItem {
    /// Parse any ABI entry, dispatching on its `type` tag
    pub fn from_json(value: &JsonValue) -> Result<Self, AbiError> {
        Self::from_serde(&to_serde(value)?)
    }

    pub(crate) fn from_serde(value: &serde_json::Value) -> Result<Self, AbiError> {
        Ok(match item_type(value)? {
            "function" => AbiItem::Function(decode_kind(
                value,
                "function",
                &["name", "inputs", "stateMutability"],
            )?),
            "constructor" => AbiItem::Constructor(decode_kind(value, "constructor", &["inputs"])?),
            "fallback" => AbiItem::Fallback(decode_kind(value, "fallback", &[])?),
            "receive" => AbiItem::Receive(decode_kind(value, "receive", &[])?),
            "event" => AbiItem::Event(decode_kind(value, "event", &["name"])?),
            "error" => AbiItem::Error(decode_kind(value, "error", &["name"])?),
            other => return Err(AbiError::UnknownItemType(other.to_string())),
        })
    }

    /// The `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            AbiItem::Function(_) => "function",
            AbiItem::Constructor(_) => "constructor",
            AbiItem::Fallback(_) => "fallback",
            AbiItem::Receive(_) => "receive",
            AbiItem::Event(_) => "event",
            AbiItem::Error(_) => "error",
        }
    }

    /// Name, for the kinds that have one
    pub fn name(&self) -> Option<&str> {
        match self {
            AbiItem::Function(f) => Some(&f.name),
            AbiItem::Event(e) => Some(&e.name),
            AbiItem::Error(e) => Some(&e.name),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &str) -> AbiError {
        AbiError::TypeMismatch {
            expected: expected.to_string(),
            found: self.kind().to_string(),
        }
    }

    /// Cast to a function
    pub fn as_function(&self) -> Result<&AbiFunction, AbiError> {
        match self {
            AbiItem::Function(f) => Ok(f),
            other => Err(other.mismatch("function")),
        }
    }

    /// Cast to a constructor
    pub fn as_constructor(&self) -> Result<&AbiConstructor, AbiError> {
        match self {
            AbiItem::Constructor(c) => Ok(c),
            other => Err(other.mismatch("constructor")),
        }
    }

    /// Cast to an event
    pub fn as_event(&self) -> Result<&AbiEvent, AbiError> {
        match self {
            AbiItem::Event(e) => Ok(e),
            other => Err(other.mismatch("event")),
        }
    }

    /// Cast to an error definition
    pub fn as_error(&self) -> Result<&AbiErrorDef, AbiError> {
        match self {
            AbiItem::Error(e) => Ok(e),
            other => Err(other.mismatch("error")),
        }
    }
}

impl<'de> Deserialize<'de> for AbiItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        AbiItem::from_serde(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(s: &str) -> JsonValue {
        JsonValue::from_str(s).unwrap()
    }

    const TRANSFER: &str = r#"{
        "type": "function",
        "name": "transfer",
        "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint"}],
        "outputs": [{"name": "", "type": "bool"}],
        "stateMutability": "nonpayable"
    }"#;

    #[test]
    fn test_function_signature_normalizes_uint() {
        let f = AbiFunction::from_json(&json(TRANSFER)).unwrap();
        assert_eq!(f.signature().unwrap(), "transfer(address,uint256)");
        assert_eq!(f.selector().unwrap(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert!(!f.is_read_only());
    }

    #[test]
    fn test_tuple_signature() {
        let f = AbiFunction::from_json(&json(
            r#"{
                "name": "submit",
                "inputs": [{
                    "name": "order",
                    "type": "tuple[]",
                    "components": [
                        {"name": "maker", "type": "address"},
                        {"name": "legs", "type": "tuple", "components": [{"name": "qty", "type": "int"}]}
                    ]
                }],
                "stateMutability": "payable"
            }"#,
        ))
        .unwrap();
        assert_eq!(f.signature().unwrap(), "submit((address,(int256))[])");
    }

    #[test]
    fn test_missing_type_defaults_to_function() {
        let item = AbiItem::from_json(&json(
            r#"{"name": "f", "inputs": [], "stateMutability": "view"}"#,
        ))
        .unwrap();
        assert_eq!(item.kind(), "function");
    }

    #[test]
    fn test_required_fields() {
        let err = AbiFunction::from_json(&json(r#"{"type": "function", "name": "f", "inputs": []}"#))
            .unwrap_err();
        assert_eq!(
            err,
            AbiError::MissingField {
                field: "stateMutability".to_string(),
                item: "function".to_string()
            }
        );

        let err = AbiConstructor::from_json(&json(r#"{"type": "constructor"}"#)).unwrap_err();
        assert!(matches!(err, AbiError::MissingField { .. }));

        let err = AbiEvent::from_json(&json(r#"{"type": "event", "inputs": []}"#)).unwrap_err();
        assert!(matches!(err, AbiError::MissingField { .. }));
    }

    #[test]
    fn test_empty_inputs_are_valid() {
        let ctor = AbiConstructor::from_json(&json(
            r#"{"type": "constructor", "inputs": [], "stateMutability": "nonpayable"}"#,
        ))
        .unwrap();
        assert!(ctor.inputs.is_empty());
    }

    #[test]
    fn test_kind_cast_mismatch() {
        let err = AbiEvent::from_json(&json(TRANSFER)).unwrap_err();
        assert_eq!(
            err,
            AbiError::TypeMismatch {
                expected: "event".to_string(),
                found: "function".to_string()
            }
        );

        let item = AbiItem::from_json(&json(TRANSFER)).unwrap();
        assert!(item.as_function().is_ok());
        assert!(matches!(item.as_error(), Err(AbiError::TypeMismatch { .. })));
    }

    #[test]
    fn test_unknown_item_type() {
        let err = AbiItem::from_json(&json(r#"{"type": "modifier", "name": "m"}"#)).unwrap_err();
        assert_eq!(err, AbiError::UnknownItemType("modifier".to_string()));
    }

    #[test]
    fn test_serialize_tags_items() {
        let item = AbiItem::from_json(&json(TRANSFER)).unwrap();
        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["type"], "function");
        assert_eq!(out["stateMutability"], "nonpayable");
        assert_eq!(out["inputs"][1]["type"], "uint");
        assert!(out["inputs"][0].get("indexed").is_none());
    }

    #[test]
    fn test_event_topic_and_log() {
        let event = AbiEvent::from_json(&json(
            r#"{
                "type": "event",
                "name": "Transfer",
                "inputs": [
                    {"name": "from", "type": "address", "indexed": true},
                    {"name": "to", "type": "address", "indexed": true},
                    {"name": "value", "type": "uint256", "indexed": false}
                ],
                "anonymous": false
            }"#,
        ))
        .unwrap();
        let topic = event.topic().unwrap();
        assert_eq!(
            topic.to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );

        let mut from = [0u8; 32];
        from[31] = 0x01;
        let mut to = [0u8; 32];
        to[31] = 0x02;
        let mut data = [0u8; 32];
        data[31] = 0x64;

        let fields = event
            .decode_log(&[topic, H256::from_bytes(from), H256::from_bytes(to)], &data)
            .unwrap();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["from", "to", "value"]);
        assert_eq!(fields["value"], AbiValue::from(100u64));
        assert_eq!(
            fields["to"].as_address().unwrap().as_bytes()[19],
            0x02
        );
    }

    #[test]
    fn test_error_decode() {
        let def = AbiErrorDef::from_json(&json(
            r#"{"type": "error", "name": "Insufficient", "inputs": [{"name": "need", "type": "uint256"}]}"#,
        ))
        .unwrap();
        assert_eq!(def.signature().unwrap(), "Insufficient(uint256)");

        let mut data = def.selector().unwrap().to_vec();
        let mut word = [0u8; 32];
        word[31] = 7;
        data.extend_from_slice(&word);
        assert_eq!(def.decode(&data).unwrap(), vec![AbiValue::from(7u64)]);
        assert!(matches!(def.decode(&word), Err(AbiError::InvalidData(_))));
    }
}
