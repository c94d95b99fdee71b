//! Contract ABI documents

use std::path::Path;

use ethkit_primitives::JsonValue;

use super::error::AbiError;
use super::schema::{AbiConstructor, AbiErrorDef, AbiEvent, AbiFallback, AbiFunction, AbiItem, AbiReceive};

/// A parsed contract ABI, items kept in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbiParser {
    items: Vec<AbiItem>,
}

impl AbiParser {
    /// Wrap already-parsed items
    pub fn new(items: Vec<AbiItem>) -> Self {
        Self { items }
    }

    // ==================== Loading ====================

    /// Parse ABI JSON text
    pub fn from_json_str(json: &str) -> Result<Self, AbiError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| AbiError::InvalidJson(e.to_string()))?;
        Self::from_serde(&value)
    }

    /// Parse raw ABI JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AbiError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| AbiError::InvalidJson(e.to_string()))?;
        Self::from_serde(&value)
    }

    /// Parse a decoded JSON document.
    ///
    /// Accepts an array of items, a compiler artifact object with an `abi`
    /// array, or a single item object.
    pub fn from_value(value: &JsonValue) -> Result<Self, AbiError> {
        let value = value
            .to_serde_value()
            .map_err(|e| AbiError::InvalidJson(e.to_string()))?;
        Self::from_serde(&value)
    }

    /// Read and parse an ABI file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AbiError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| AbiError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&bytes)
    }

    /// Fetch and parse an ABI served over HTTP
    #[cfg(feature = "http")]
    pub async fn from_url(url: &str) -> Result<Self, AbiError> {
        let response = reqwest::get(url)
            .await
            .map_err(|e| AbiError::Io(format!("{}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(AbiError::Io(format!("{}: HTTP {}", url, response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AbiError::Io(format!("{}: {}", url, e)))?;
        Self::from_bytes(&bytes)
    }

    fn from_serde(value: &serde_json::Value) -> Result<Self, AbiError> {
        let entries = match value {
            serde_json::Value::Array(entries) => entries.as_slice(),
            serde_json::Value::Object(obj) => match obj.get("abi") {
                Some(serde_json::Value::Array(entries)) => entries.as_slice(),
                Some(other) => {
                    return Err(AbiError::InvalidJson(format!(
                        "abi field must be an array, got {}",
                        json_kind(other)
                    )))
                }
                None => std::slice::from_ref(value),
            },
            other => {
                return Err(AbiError::InvalidJson(format!(
                    "expected an array or object, got {}",
                    json_kind(other)
                )))
            }
        };

        let items = entries
            .iter()
            .map(AbiItem::from_serde)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    // ==================== Serialization ====================

    /// Serialize back to ABI JSON text
    pub fn to_json(&self) -> Result<String, AbiError> {
        serde_json::to_string(&self.items).map_err(|e| AbiError::InvalidJson(e.to_string()))
    }

    /// Serialize to a JSON value
    pub fn to_value(&self) -> Result<JsonValue, AbiError> {
        JsonValue::from_serializable(&self.items).map_err(|e| AbiError::InvalidJson(e.to_string()))
    }

    // ==================== Queries ====================

    /// All items in document order
    pub fn items(&self) -> &[AbiItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ABI has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every function, overloads included
    pub fn functions(&self) -> Vec<&AbiFunction> {
        self.items
            .iter()
            .filter_map(|item| match item {
                AbiItem::Function(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Every event
    pub fn events(&self) -> Vec<&AbiEvent> {
        self.items
            .iter()
            .filter_map(|item| match item {
                AbiItem::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Every custom error
    pub fn errors(&self) -> Vec<&AbiErrorDef> {
        self.items
            .iter()
            .filter_map(|item| match item {
                AbiItem::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// The first constructor, if any
    pub fn constructor(&self) -> Option<&AbiConstructor> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Constructor(c) => Some(c),
            _ => None,
        })
    }

    /// The fallback function, if any
    pub fn fallback(&self) -> Option<&AbiFallback> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Fallback(f) => Some(f),
            _ => None,
        })
    }

    /// The receive function, if any
    pub fn receive(&self) -> Option<&AbiReceive> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Receive(r) => Some(r),
            _ => None,
        })
    }

    /// Functions with this name (all overloads, document order)
    pub fn function(&self, name: &str) -> Vec<&AbiFunction> {
        self.functions()
            .into_iter()
            .filter(|f| f.name == name)
            .collect()
    }

    /// The first overload of `name` taking `arity` arguments
    pub fn function_with_arity(&self, name: &str, arity: usize) -> Result<&AbiFunction, AbiError> {
        let overloads = self.function(name);
        let first = overloads.first().ok_or_else(|| AbiError::MissingField {
            field: name.to_string(),
            item: "contract ABI".to_string(),
        })?;
        overloads
            .iter()
            .find(|f| f.inputs.len() == arity)
            .copied()
            .ok_or(AbiError::ArgumentCountMismatch {
                expected: first.inputs.len(),
                got: arity,
            })
    }

    /// Events with this name
    pub fn event(&self, name: &str) -> Vec<&AbiEvent> {
        self.events().into_iter().filter(|e| e.name == name).collect()
    }

    /// Errors with this name
    pub fn error(&self, name: &str) -> Vec<&AbiErrorDef> {
        self.errors().into_iter().filter(|e| e.name == name).collect()
    }

    /// The function whose selector matches.
    ///
    /// Functions with unparsable types are skipped.
    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&AbiFunction> {
        self.functions()
            .into_iter()
            .find(|f| f.selector().map(|s| s == selector).unwrap_or(false))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
