//! Dynamic JSON value
//!
//! A closed tagged union for "any JSON" payloads: RPC params and results,
//! and loosely-typed arguments handed to the ABI codec.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Insertion-ordered object map
pub type JsonMap = IndexMap<String, JsonValue>;

/// JSON encode/decode error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    /// Malformed JSON text
    #[error("json parse error: {0}")]
    Parse(String),
    /// Value cannot be represented by the closed JSON value set
    #[error("unsupported json value: {0}")]
    UnsupportedValue(String),
}

/// Dynamic JSON value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer fitting i64
    Int(i64),
    /// Any other number
    Float(f64),
    /// String
    String(String),
    /// Ordered array
    Array(Vec<JsonValue>),
    /// Insertion-ordered object
    Object(JsonMap),
}

impl JsonValue {
    /// Decode JSON text
    pub fn from_str(s: &str) -> Result<Self, JsonError> {
        serde_json::from_str(s).map_err(|e| JsonError::Parse(e.to_string()))
    }

    /// Decode JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, JsonError> {
        serde_json::from_slice(bytes).map_err(|e| JsonError::Parse(e.to_string()))
    }

    /// Encode to compact JSON text
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        serde_json::to_string(self).map_err(|e| JsonError::UnsupportedValue(e.to_string()))
    }

    /// Encode to pretty-printed JSON text
    pub fn to_json_string_pretty(&self) -> Result<String, JsonError> {
        serde_json::to_string_pretty(self).map_err(|e| JsonError::UnsupportedValue(e.to_string()))
    }

    /// Convert any serializable value, rejecting shapes outside the closed set
    /// (integers beyond the 64-bit ranges, non-string map keys, non-finite floats).
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, JsonError> {
        let raw = serde_json::to_value(value)
            .map_err(|e| JsonError::UnsupportedValue(e.to_string()))?;
        Self::try_from_serde(raw)
    }

    fn try_from_serde(value: serde_json::Value) -> Result<Self, JsonError> {
        Ok(match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    JsonValue::Int(i)
                } else if n.is_f64() {
                    JsonValue::Float(n.as_f64().unwrap_or_default())
                } else {
                    return Err(JsonError::UnsupportedValue(format!(
                        "integer {} exceeds the signed 64-bit range",
                        n
                    )));
                }
            }
            serde_json::Value::Array(items) => JsonValue::Array(
                items
                    .into_iter()
                    .map(Self::try_from_serde)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => {
                let mut out = JsonMap::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key, Self::try_from_serde(value)?);
                }
                JsonValue::Object(out)
            }
            other => JsonValue::from(other),
        })
    }

    /// Convert into a `serde_json::Value`
    pub fn to_serde_value(&self) -> Result<serde_json::Value, JsonError> {
        serde_json::to_value(self).map_err(|e| JsonError::UnsupportedValue(e.to_string()))
    }

    /// Check for `null`
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsonValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Int(i) => Some(*i as f64),
            JsonValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Array payload
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Object payload
    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key on an object value
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "bool",
            JsonValue::Int(_) => "integer",
            JsonValue::Float(_) => "float",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "<{}>", self.kind()),
        }
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Int(i) => serializer.serialize_i64(*i),
            JsonValue::Float(f) => {
                if !f.is_finite() {
                    return Err(ser::Error::custom(format!(
                        "non-finite float {} has no JSON representation",
                        f
                    )));
                }
                serializer.serialize_f64(*f)
            }
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

struct JsonValueVisitor;

impl<'de> Visitor<'de> for JsonValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonValue, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        Ok(match i64::try_from(v) {
            Ok(i) => JsonValue::Int(i),
            Err(_) => JsonValue::Float(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        Ok(JsonValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<JsonValue, A::Error> {
        let mut map = JsonMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, JsonValue>()? {
            map.insert(key, value);
        }
        Ok(JsonValue::Object(map))
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonValueVisitor)
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => JsonValue::Int(i),
                None => JsonValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        JsonValue::Bool(v)
    }
}

impl From<i64> for JsonValue {
    fn from(v: i64) -> Self {
        JsonValue::Int(v)
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        JsonValue::Float(v)
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        JsonValue::String(v.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        JsonValue::String(v)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(v: Vec<JsonValue>) -> Self {
        JsonValue::Array(v)
    }
}

impl From<JsonMap> for JsonValue {
    fn from(v: JsonMap) -> Self {
        JsonValue::Object(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(JsonValue::from_str("null").unwrap(), JsonValue::Null);
        assert_eq!(JsonValue::from_str("true").unwrap(), JsonValue::Bool(true));
        assert_eq!(JsonValue::from_str("-7").unwrap(), JsonValue::Int(-7));
        assert_eq!(JsonValue::from_str("1.5").unwrap(), JsonValue::Float(1.5));
        assert_eq!(
            JsonValue::from_str("\"hi\"").unwrap(),
            JsonValue::String("hi".to_string())
        );
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let value = JsonValue::from_str("18446744073709551615").unwrap();
        assert!(matches!(value, JsonValue::Float(_)));
    }

    #[test]
    fn test_object_preserves_insertion_order() {
        let value = JsonValue::from_str(r#"{"zeta":1,"alpha":2,"mid":[true,null]}"#).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            value.to_json_string().unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":[true,null]}"#
        );
    }

    #[test]
    fn test_non_finite_float_fails_to_encode() {
        let result = JsonValue::Float(f64::NAN).to_json_string();
        assert!(matches!(result, Err(JsonError::UnsupportedValue(_))));

        let nested = JsonValue::Array(vec![JsonValue::Float(f64::INFINITY)]);
        assert!(nested.to_json_string().is_err());
    }

    #[test]
    fn test_from_serializable_rejects_huge_integers() {
        assert_eq!(JsonValue::from_serializable(&5u8).unwrap(), JsonValue::Int(5));
        assert!(matches!(
            JsonValue::from_serializable(&u64::MAX),
            Err(JsonError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_from_serializable_rejects_non_string_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(vec![1u8], 1u8);
        assert!(JsonValue::from_serializable(&map).is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            JsonValue::from_str("{not json"),
            Err(JsonError::Parse(_))
        ));
    }

    #[test]
    fn test_accessors() {
        let value = JsonValue::from(serde_json::json!({"n": 3, "s": "x", "b": false}));
        assert_eq!(value.get("n").and_then(JsonValue::as_i64), Some(3));
        assert_eq!(value.get("s").and_then(JsonValue::as_str), Some("x"));
        assert_eq!(value.get("b").and_then(JsonValue::as_bool), Some(false));
        assert!(value.get("missing").is_none());
    }
}
