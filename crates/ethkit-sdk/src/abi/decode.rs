//! ABI decoding

use ethkit_primitives::{Address, I256, U256};

use super::error::AbiError;
use super::schema::AbiFunction;
use super::types::{AbiValue, ParamType, TypeCategory};

/// Decode a hex return value against a function's outputs.
///
/// A lone `string` or `bytes` output is rejected with `UnsupportedType`.
pub fn decode_result(function: &AbiFunction, data: &str) -> Result<Vec<AbiValue>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(digits).map_err(|e| AbiError::InvalidData(format!("invalid hex: {}", e)))?;

    let types = function.output_types()?;
    if types.is_empty() {
        return Err(AbiError::NoOutputs);
    }
    if bytes.len() < 32 {
        return Err(AbiError::InsufficientData(format!(
            "return data is {} bytes, need at least 32",
            bytes.len()
        )));
    }

    if let [single] = types.as_slice() {
        match single.category() {
            TypeCategory::StaticScalar => return Ok(vec![decode_word(single, &read_word(&bytes, 0)?)]),
            TypeCategory::DynamicScalar => return Err(AbiError::UnsupportedType(single.canonical())),
            _ => {}
        }
    }

    decode_params(&types, &bytes)
}

/// Decode an argument block for the given types
pub fn decode_params(types: &[ParamType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let types: Vec<&ParamType> = types.iter().collect();
    decode_sequence(&types, data)
}

/// Walk the head of `block`; dynamic members follow offsets relative to `block`
fn decode_sequence(types: &[&ParamType], block: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = 0;

    for ty in types {
        if ty.is_dynamic() {
            let offset = word_to_usize(&read_word(block, cursor)?, "offset")?;
            let tail = block.get(offset..).ok_or_else(|| {
                AbiError::InsufficientData(format!(
                    "offset {} is past the end of a {}-byte block",
                    offset,
                    block.len()
                ))
            })?;
            values.push(decode_value(ty, tail)?);
            cursor += 32;
        } else {
            let head = block.get(cursor..).ok_or_else(|| {
                AbiError::InsufficientData(format!("head ends at {}, block is {} bytes", cursor, block.len()))
            })?;
            values.push(decode_value(ty, head)?);
            cursor += ty.head_size()?;
        }
    }

    Ok(values)
}

/// Decode one value whose encoding starts at `data[0]`
fn decode_value(ty: &ParamType, data: &[u8]) -> Result<AbiValue, AbiError> {
    match ty.category() {
        TypeCategory::StaticScalar => Ok(decode_word(ty, &read_word(data, 0)?)),
        TypeCategory::DynamicScalar => {
            let len = word_to_usize(&read_word(data, 0)?, "length")?;
            let content = data.get(32..32 + len).ok_or_else(|| {
                AbiError::InsufficientData(format!(
                    "need {} content bytes, have {}",
                    len,
                    data.len().saturating_sub(32)
                ))
            })?;
            match ty {
                ParamType::String => String::from_utf8(content.to_vec())
                    .map(AbiValue::String)
                    .map_err(|e| AbiError::InvalidData(format!("invalid UTF-8: {}", e))),
                _ => Ok(AbiValue::Bytes(content.to_vec())),
            }
        }
        TypeCategory::DynamicArray => {
            let ParamType::Array(inner) = ty else {
                return Err(AbiError::UnsupportedType(ty.canonical()));
            };
            let len = word_to_usize(&read_word(data, 0)?, "length")?;
            let elements = &data[32..];
            // Every element occupies at least one head word
            if len > elements.len() / 32 {
                return Err(AbiError::InsufficientData(format!(
                    "array of {} elements in {} bytes",
                    len,
                    elements.len()
                )));
            }
            let types = vec![&**inner; len];
            decode_sequence(&types, elements).map(AbiValue::List)
        }
        TypeCategory::StaticTuple | TypeCategory::DynamicTuple => {
            let types: Vec<&ParamType> = match ty {
                ParamType::FixedArray(inner, n) => {
                    let element_size = if inner.is_dynamic() { 32 } else { inner.head_size()? };
                    let needed = element_size.checked_mul(*n).ok_or_else(|| {
                        AbiError::InsufficientData(format!("{} cannot fit in {} bytes", ty, data.len()))
                    })?;
                    if needed > data.len() {
                        return Err(AbiError::InsufficientData(format!(
                            "{} needs {} bytes, have {}",
                            ty,
                            needed,
                            data.len()
                        )));
                    }
                    vec![&**inner; *n]
                }
                ParamType::Tuple(members) => members.iter().map(|(_, t)| t).collect(),
                _ => return Err(AbiError::UnsupportedType(ty.canonical())),
            };
            decode_sequence(&types, data).map(AbiValue::List)
        }
    }
}

/// Inverse of the static-scalar word encoding
pub(crate) fn decode_word(ty: &ParamType, word: &[u8; 32]) -> AbiValue {
    match ty {
        ParamType::Address => {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            AbiValue::Address(Address::from_bytes(bytes))
        }
        ParamType::Int(_) => AbiValue::Int(I256::from_twos_complement(word)),
        ParamType::Bool => AbiValue::Bool(word[31] != 0),
        ParamType::FixedBytes(n) => AbiValue::Bytes(word[..(*n).min(32)].to_vec()),
        _ => AbiValue::Int(I256::from_u256(U256::from_big_endian(word))),
    }
}

fn read_word(data: &[u8], at: usize) -> Result<[u8; 32], AbiError> {
    data.get(at..at + 32)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            AbiError::InsufficientData(format!(
                "need 32 bytes at {}, have {}",
                at,
                data.len()
            ))
        })
}

fn word_to_usize(word: &[u8; 32], what: &str) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(word);
    if value.bits() > 32 {
        return Err(AbiError::InsufficientData(format!("{} {} out of range", what, value)));
    }
    Ok(value.low_u64() as usize)
}
