//! ABI encoding

use ethkit_primitives::{Address, I256, U256};

use super::error::AbiError;
use super::schema::{AbiConstructor, AbiFunction};
use super::types::{AbiValue, ParamType, TypeCategory};

/// Encode a function call as `0x` + selector + arguments
pub fn encode_call(function: &AbiFunction, args: &[AbiValue]) -> Result<String, AbiError> {
    Ok(format!("0x{}", hex::encode(encode_function_data(function, args)?)))
}

/// Encode a function call to raw bytes (selector + arguments)
pub fn encode_function_data(function: &AbiFunction, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let selector = function.selector()?;
    let types = function.input_types()?;
    let mut data = selector.to_vec();
    data.extend(encode_params(&types, args)?);
    Ok(data)
}

/// Encode constructor arguments; contract-creation data has no selector
pub fn encode_constructor(
    constructor: &AbiConstructor,
    args: &[AbiValue],
) -> Result<Vec<u8>, AbiError> {
    encode_params(&constructor.input_types()?, args)
}

/// Encode an argument block for the given types
pub fn encode_params(types: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArgumentCountMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    let types: Vec<&ParamType> = types.iter().collect();
    let values: Vec<&AbiValue> = values.iter().collect();
    encode_sequence(&types, &values)
}

/// Head/tail layout of one block. Offsets are relative to the block start.
fn encode_sequence(types: &[&ParamType], values: &[&AbiValue]) -> Result<Vec<u8>, AbiError> {
    let head_size = types.iter().try_fold(0usize, |total, t| {
        total
            .checked_add(t.head_size()?)
            .ok_or_else(|| AbiError::InvalidSignature("argument block is too large to encode".to_string()))
    })?;

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (ty, value) in types.iter().zip(values) {
        let encoded = encode_value(ty, value)?;
        if ty.is_dynamic() {
            head.extend_from_slice(&u256_word(U256::from(head_size + tail.len())));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_value(ty: &ParamType, value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    match ty.category() {
        TypeCategory::StaticScalar => Ok(encode_word(ty, value)?.to_vec()),
        TypeCategory::DynamicScalar => {
            let bytes = match ty {
                ParamType::String => string_value(value)?.as_bytes().to_vec(),
                _ => bytes_value(value)?,
            };
            Ok(encode_bytes(&bytes))
        }
        TypeCategory::DynamicArray => {
            let ParamType::Array(inner) = ty else {
                return Err(AbiError::UnsupportedType(ty.canonical()));
            };
            let items = list_value(ty, value)?;
            let types = vec![&**inner; items.len()];
            let items: Vec<&AbiValue> = items.iter().collect();
            let mut out = u256_word(U256::from(items.len())).to_vec();
            out.extend(encode_sequence(&types, &items)?);
            Ok(out)
        }
        TypeCategory::StaticTuple | TypeCategory::DynamicTuple => {
            let (types, items) = members(ty, value)?;
            encode_sequence(&types, &items)
        }
    }
}

/// Member types and values of a tuple or fixed array
fn members<'a>(
    ty: &'a ParamType,
    value: &'a AbiValue,
) -> Result<(Vec<&'a ParamType>, Vec<&'a AbiValue>), AbiError> {
    match ty {
        ParamType::FixedArray(inner, n) => {
            let items = list_value(ty, value)?;
            if items.len() != *n {
                return Err(AbiError::InvalidValue(format!(
                    "{} expects {} elements, got {}",
                    ty,
                    n,
                    items.len()
                )));
            }
            Ok((vec![&**inner; *n], items.iter().collect()))
        }
        ParamType::Tuple(fields) => {
            let types = fields.iter().map(|(_, t)| t).collect();
            let items = match value {
                AbiValue::List(items) => {
                    if items.len() != fields.len() {
                        return Err(AbiError::InvalidValue(format!(
                            "{} expects {} members, got {}",
                            ty,
                            fields.len(),
                            items.len()
                        )));
                    }
                    items.iter().collect()
                }
                AbiValue::Map(map) => fields
                    .iter()
                    .map(|(name, _)| {
                        map.get(name).ok_or_else(|| {
                            AbiError::InvalidValue(format!("missing tuple member '{}'", name))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                other => {
                    return Err(AbiError::InvalidValue(format!(
                        "expected list or map for {}, got {}",
                        ty,
                        other.kind()
                    )))
                }
            };
            Ok((types, items))
        }
        _ => Err(AbiError::UnsupportedType(ty.canonical())),
    }
}

/// One 32-byte word for a static scalar
fn encode_word(ty: &ParamType, value: &AbiValue) -> Result<[u8; 32], AbiError> {
    match ty {
        ParamType::Address => {
            let address = address_value(value)?;
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(address.as_bytes());
            Ok(word)
        }
        ParamType::Uint(bits) => {
            let v = int_value(value)?;
            if !v.fits_uint(*bits) {
                return Err(AbiError::InvalidValue(format!("{} out of range for {}", v, ty)));
            }
            Ok(v.to_twos_complement())
        }
        ParamType::Int(bits) => {
            let v = int_value(value)?;
            if !v.fits_int(*bits) {
                return Err(AbiError::InvalidValue(format!("{} out of range for {}", v, ty)));
            }
            Ok(v.to_twos_complement())
        }
        ParamType::Bool => {
            let mut word = [0u8; 32];
            word[31] = u8::from(bool_value(value)?);
            Ok(word)
        }
        ParamType::FixedBytes(size) => {
            let bytes = bytes_value(value)?;
            if bytes.len() > *size {
                return Err(AbiError::FixedBytesOverflow {
                    size: *size,
                    got: bytes.len(),
                });
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(word)
        }
        _ => Err(AbiError::UnsupportedType(ty.canonical())),
    }
}

fn mismatch(expected: &str, value: &AbiValue) -> AbiError {
    AbiError::InvalidValue(format!("expected {}, got {}", expected, value.kind()))
}

fn address_value(value: &AbiValue) -> Result<Address, AbiError> {
    match value {
        AbiValue::Address(a) => Ok(a.clone()),
        AbiValue::String(s) => {
            Address::from_hex(s).map_err(|_| AbiError::InvalidAddressLength(s.chars().count()))
        }
        AbiValue::Bytes(b) if b.len() == Address::LEN => {
            Address::from_slice(b).map_err(|e| AbiError::InvalidValue(e.to_string()))
        }
        other => Err(mismatch("address", other)),
    }
}

fn int_value(value: &AbiValue) -> Result<I256, AbiError> {
    match value {
        AbiValue::Int(v) => Ok(*v),
        AbiValue::String(s) => {
            I256::parse(s).ok_or_else(|| AbiError::InvalidValue(format!("not an integer: {:?}", s)))
        }
        other => Err(mismatch("integer", other)),
    }
}

fn bool_value(value: &AbiValue) -> Result<bool, AbiError> {
    match value {
        AbiValue::Bool(b) => Ok(*b),
        AbiValue::Int(v) if v.is_zero() => Ok(false),
        AbiValue::Int(v) if *v == I256::from(1u64) => Ok(true),
        other => Err(mismatch("bool", other)),
    }
}

fn bytes_value(value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    match value {
        AbiValue::Bytes(b) => Ok(b.clone()),
        AbiValue::String(s) => {
            let digits = s
                .strip_prefix("0x")
                .ok_or_else(|| AbiError::InvalidValue(format!("bytes string must start with 0x: {:?}", s)))?;
            hex::decode(digits).map_err(|e| AbiError::InvalidValue(format!("invalid hex {:?}: {}", s, e)))
        }
        other => Err(mismatch("bytes", other)),
    }
}

fn string_value(value: &AbiValue) -> Result<&str, AbiError> {
    match value {
        AbiValue::String(s) => Ok(s),
        other => Err(mismatch("string", other)),
    }
}

fn list_value<'a>(ty: &ParamType, value: &'a AbiValue) -> Result<&'a [AbiValue], AbiError> {
    value
        .as_list()
        .ok_or_else(|| AbiError::InvalidValue(format!("expected list for {}, got {}", ty, value.kind())))
}

/// Convert U256 to a 32-byte big-endian word
fn u256_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Length word plus content right-padded to a 32-byte boundary
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = u256_word(U256::from(data.len())).to_vec();
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);
    result
}
