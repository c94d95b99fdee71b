//! ABI type model and dynamic values

use std::fmt;

use ethkit_primitives::{Address, JsonValue, I256, U256};
use indexmap::IndexMap;

use super::error::AbiError;
use super::schema::AbiParameter;

/// Solidity parameter types, parsed once from their type strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple; member names may be empty
    Tuple(Vec<(String, ParamType)>),
}

/// Layout class of a type, which decides how it is laid out in head/tail form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// One 32-byte word in place
    StaticScalar,
    /// Tuple or fixed array of static members, inlined in the head
    StaticTuple,
    /// `string` / `bytes`: length word plus padded content in the tail
    DynamicScalar,
    /// `T[]`: length word plus an element block in the tail
    DynamicArray,
    /// Tuple or fixed array with a dynamic member, encoded in the tail
    DynamicTuple,
}

impl TypeCategory {
    /// Whether values of this category live in the tail
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            TypeCategory::DynamicScalar | TypeCategory::DynamicArray | TypeCategory::DynamicTuple
        )
    }
}

impl ParamType {
    /// Parse a type string such as `uint256`, `address[]` or `(uint8,bytes)[2]`.
    ///
    /// `tuple` needs components and is only accepted through [`AbiParameter::param_type`].
    pub fn parse(s: &str) -> Result<ParamType, AbiError> {
        Self::parse_with(s.trim(), None)
    }

    pub(crate) fn parse_with(
        s: &str,
        components: Option<&[AbiParameter]>,
    ) -> Result<ParamType, AbiError> {
        if s.is_empty() {
            return Err(AbiError::InvalidSignature("empty type string".to_string()));
        }

        if let Some(stripped) = s.strip_suffix(']') {
            let open = stripped
                .rfind('[')
                .ok_or_else(|| AbiError::InvalidSignature(format!("unbalanced brackets in {}", s)))?;
            let inner = Self::parse_with(&stripped[..open], components)?;
            let len = &stripped[open + 1..];
            if len.is_empty() {
                return Ok(ParamType::Array(Box::new(inner)));
            }
            let n: usize = len
                .parse()
                .map_err(|_| AbiError::InvalidSignature(format!("invalid array length in {}", s)))?;
            if n == 0 {
                return Err(AbiError::InvalidSignature(format!("zero-length array in {}", s)));
            }
            return Ok(ParamType::FixedArray(Box::new(inner), n));
        }

        if s.starts_with('(') {
            let body = s
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| AbiError::InvalidSignature(format!("unbalanced parentheses in {}", s)))?;
            let members = split_top_level(body)?
                .into_iter()
                .map(|member| Ok((String::new(), Self::parse_with(member.trim(), None)?)))
                .collect::<Result<Vec<_>, AbiError>>()?;
            return Ok(ParamType::Tuple(members));
        }

        if s == "tuple" {
            let components = components.ok_or_else(|| {
                AbiError::InvalidSignature("tuple type without components".to_string())
            })?;
            let members = components
                .iter()
                .map(|c| Ok((c.name.clone(), c.param_type()?)))
                .collect::<Result<Vec<_>, AbiError>>()?;
            return Ok(ParamType::Tuple(members));
        }

        if s.contains(|c| matches!(c, '[' | ']' | '(' | ')' | ',')) {
            return Err(AbiError::InvalidSignature(format!("malformed type {}", s)));
        }
        parse_elementary(s)
    }

    /// Layout class
    pub fn category(&self) -> TypeCategory {
        match self {
            ParamType::Address
            | ParamType::Uint(_)
            | ParamType::Int(_)
            | ParamType::Bool
            | ParamType::FixedBytes(_) => TypeCategory::StaticScalar,
            ParamType::String | ParamType::Bytes => TypeCategory::DynamicScalar,
            ParamType::Array(_) => TypeCategory::DynamicArray,
            ParamType::FixedArray(inner, _) => {
                if inner.is_dynamic() {
                    TypeCategory::DynamicTuple
                } else {
                    TypeCategory::StaticTuple
                }
            }
            ParamType::Tuple(members) => {
                if members.iter().any(|(_, t)| t.is_dynamic()) {
                    TypeCategory::DynamicTuple
                } else {
                    TypeCategory::StaticTuple
                }
            }
        }
    }

    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        self.category().is_dynamic()
    }

    /// Bytes this type occupies in the head of its enclosing block.
    ///
    /// Fails with `InvalidSignature` when the size does not fit in `usize`.
    pub fn head_size(&self) -> Result<usize, AbiError> {
        let overflow = || AbiError::InvalidSignature(format!("{} is too large to encode", self));
        match (self.category(), self) {
            (TypeCategory::StaticTuple, ParamType::FixedArray(inner, n)) => {
                inner.head_size()?.checked_mul(*n).ok_or_else(overflow)
            }
            (TypeCategory::StaticTuple, ParamType::Tuple(members)) => {
                members.iter().try_fold(0usize, |total, (_, t)| {
                    total.checked_add(t.head_size()?).ok_or_else(&overflow)
                })
            }
            _ => Ok(32),
        }
    }

    /// Canonical signature form (`uint256`, `(address,bool)[]`, ...)
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => f.write_str("bool"),
            ParamType::String => f.write_str("string"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(n) => write!(f, "bytes{}", n),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, n) => write!(f, "{}[{}]", inner, n),
            ParamType::Tuple(members) => {
                f.write_str("(")?;
                for (i, (_, t)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", t)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Split a tuple body on commas that are not nested in parentheses
fn split_top_level(body: &str) -> Result<Vec<&str>, AbiError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(AbiError::InvalidSignature(format!(
                        "unbalanced parentheses in ({})",
                        body
                    )));
                }
            }
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AbiError::InvalidSignature(format!(
            "unbalanced parentheses in ({})",
            body
        )));
    }
    parts.push(&body[start..]);
    Ok(parts)
}

fn parse_bits(s: &str, suffix: &str) -> Result<usize, AbiError> {
    if suffix.is_empty() {
        return Ok(256);
    }
    match suffix.parse::<usize>() {
        Ok(bits) if bits > 0 && bits <= 256 && bits % 8 == 0 => Ok(bits),
        _ => Err(AbiError::UnsupportedType(s.to_string())),
    }
}

fn parse_elementary(s: &str) -> Result<ParamType, AbiError> {
    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        return parse_bits(s, rest).map(ParamType::Uint);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return parse_bits(s, rest).map(ParamType::Int);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        return match rest.parse::<usize>() {
            Ok(n) if (1..=32).contains(&n) => Ok(ParamType::FixedBytes(n)),
            _ => Err(AbiError::UnsupportedType(s.to_string())),
        };
    }

    Err(AbiError::UnsupportedType(s.to_string()))
}

/// Dynamic value handed to the encoder and produced by the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Any `uintN` / `intN`
    Int(I256),
    /// Address
    Address(Address),
    /// Boolean
    Bool(bool),
    /// UTF-8 string (also accepted for addresses, integers and hex bytes)
    String(String),
    /// `bytes` / `bytesN`
    Bytes(Vec<u8>),
    /// Arrays, and tuples by position
    List(Vec<AbiValue>),
    /// Tuples by component name
    Map(IndexMap<String, AbiValue>),
}

impl AbiValue {
    /// Unsigned integer value
    pub fn uint(value: impl Into<U256>) -> Self {
        AbiValue::Int(I256::from_u256(value.into()))
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<&I256> {
        match self {
            AbiValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Non-negative integer payload as `U256`
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            AbiValue::Int(v) if !v.is_negative() => Some(v.abs()),
            _ => None,
        }
    }

    /// Address payload
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AbiValue::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Byte payload
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// List payload
    pub fn as_list(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Int(_) => "integer",
            AbiValue::Address(_) => "address",
            AbiValue::Bool(_) => "bool",
            AbiValue::String(_) => "string",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::List(_) => "list",
            AbiValue::Map(_) => "map",
        }
    }

    /// Convert loosely-typed JSON arguments. Strings stay strings and are
    /// coerced against the declared type at encode time.
    pub fn from_json(value: &JsonValue) -> Result<Self, AbiError> {
        Ok(match value {
            JsonValue::Null => return Err(AbiError::InvalidValue("null argument".to_string())),
            JsonValue::Bool(b) => AbiValue::Bool(*b),
            JsonValue::Int(i) => AbiValue::Int(I256::from(*i)),
            JsonValue::Float(f) => {
                return Err(AbiError::InvalidValue(format!(
                    "non-integer number {}; pass large integers as strings",
                    f
                )))
            }
            JsonValue::String(s) => AbiValue::String(s.clone()),
            JsonValue::Array(items) => AbiValue::List(
                items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            JsonValue::Object(map) => AbiValue::Map(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json(v)?)))
                    .collect::<Result<_, AbiError>>()?,
            ),
        })
    }

    /// Render as JSON: integers beyond i64 become decimal strings, bytes become hex
    pub fn to_json(&self) -> JsonValue {
        match self {
            AbiValue::Int(v) => match v.to_i64() {
                Some(i) => JsonValue::Int(i),
                None => JsonValue::String(v.to_string()),
            },
            AbiValue::Address(a) => JsonValue::String(a.to_hex()),
            AbiValue::Bool(b) => JsonValue::Bool(*b),
            AbiValue::String(s) => JsonValue::String(s.clone()),
            AbiValue::Bytes(b) => JsonValue::String(format!("0x{}", hex::encode(b))),
            AbiValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            AbiValue::Map(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Int(I256::from_u256(v))
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Int(I256::from(v))
    }
}

impl From<i64> for AbiValue {
    fn from(v: i64) -> Self {
        AbiValue::Int(I256::from(v))
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(v: Vec<u8>) -> Self {
        AbiValue::Bytes(v)
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(v: Vec<AbiValue>) -> Self {
        AbiValue::List(v)
    }
}
