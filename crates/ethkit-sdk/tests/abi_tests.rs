//! ABI integration tests for ethkit-sdk
//!
//! Exercises the codec boundary the way applications use it: parse an ABI,
//! encode a call, decode what the node returns.

use ethkit_sdk::abi::{
    decode_params, decode_result, encode_call, encode_params, AbiFunction, AbiItem, ParamType,
};
use ethkit_sdk::contract::{self, ERC20_ABI};
use ethkit_sdk::{AbiError, AbiParser, AbiValue, Address, JsonValue, I256, U256};

const HOLDER: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";

fn erc20() -> AbiParser {
    AbiParser::from_json_str(ERC20_ABI).unwrap()
}

// ==================== Selectors ====================

#[test]
fn test_erc20_selectors() {
    let abi = erc20();
    let cases = [
        ("transfer", "a9059cbb"),
        ("balanceOf", "70a08231"),
        ("approve", "095ea7b3"),
        ("transferFrom", "23b872dd"),
        ("totalSupply", "18160ddd"),
    ];
    for (name, selector) in cases {
        let function = abi.function(name)[0];
        assert_eq!(hex::encode(function.selector().unwrap()), selector, "{}", name);
    }
}

#[test]
fn test_lookup_by_selector() {
    let abi = erc20();
    let function = abi.function_by_selector([0xa9, 0x05, 0x9c, 0xbb]).unwrap();
    assert_eq!(function.name, "transfer");
}

#[test]
fn test_transfer_event_topic() {
    let abi = erc20();
    let transfer = abi.event("Transfer")[0];
    assert_eq!(
        transfer.topic().unwrap().to_hex(),
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
    );
}

// ==================== Encoding ====================

#[test]
fn test_encode_transfer_layout() {
    let abi = erc20();
    let data = abi.function("transfer")[0]
        .encode_call(&[AbiValue::from(HOLDER), AbiValue::from(1000u64)])
        .unwrap();

    assert_eq!(
        data,
        concat!(
            "0xa9059cbb",
            "000000000000000000000000742d35cc6634c0532925a3b844bc9e7595f0ab3d",
            "00000000000000000000000000000000000000000000000000000000000003e8"
        )
    );
}

#[test]
fn test_encode_argument_count_mismatch() {
    let abi = erc20();
    let err = abi.function("transfer")[0]
        .encode_call(&[AbiValue::from(HOLDER)])
        .unwrap_err();
    assert_eq!(err, AbiError::ArgumentCountMismatch { expected: 2, got: 1 });
}

#[test]
fn test_encode_short_address() {
    let abi = erc20();
    let err = abi.function("balanceOf")[0]
        .encode_call(&[AbiValue::from("0x1234")])
        .unwrap_err();
    assert!(matches!(err, AbiError::InvalidAddressLength(_)));
}

#[test]
fn test_encode_uint8_out_of_range() {
    let types = vec![ParamType::parse("uint8").unwrap()];
    assert!(matches!(
        encode_params(&types, &[AbiValue::from(256u64)]),
        Err(AbiError::InvalidValue(_))
    ));
}

#[test]
fn test_encode_negative_into_uint() {
    let types = vec![ParamType::parse("uint256").unwrap()];
    assert!(encode_params(&types, &[AbiValue::from(-1i64)]).is_err());
}

// ==================== Decoding ====================

#[test]
fn test_balance_of_result() {
    let token = contract::erc20(Address::from_hex(HOLDER).unwrap()).unwrap();
    let values = token
        .decode_output(
            "balanceOf",
            "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000",
        )
        .unwrap();
    assert_eq!(values[0].as_u256(), Some(U256::from(1_000_000_000_000_000_000u64)));
}

#[test]
fn test_transfer_result_bool() {
    let token = contract::erc20(Address::zero()).unwrap();
    let values = token
        .decode_output("transfer", &format!("0x{:0>64}", "1"))
        .unwrap();
    assert_eq!(values, vec![AbiValue::Bool(true)]);
}

#[test]
fn test_single_string_output_unsupported() {
    let token = contract::erc20(Address::zero()).unwrap();
    let data = format!("0x{:0>64}{:0>64}", "20", "0");
    assert_eq!(
        token.decode_output("name", &data),
        Err(AbiError::UnsupportedType("string".to_string()))
    );
}

/// `function echo(T value) returns (T)`
fn echo(ty: &str) -> AbiFunction {
    let json = format!(
        r#"{{"type": "function", "name": "echo", "inputs": [{{"name": "value", "type": "{0}"}}],
            "outputs": [{{"name": "", "type": "{0}"}}], "stateMutability": "pure"}}"#,
        ty
    );
    AbiFunction::from_json(&JsonValue::from_str(&json).unwrap()).unwrap()
}

#[test]
fn test_scalar_call_result_round_trip() {
    let cases = vec![
        ("uint256", AbiValue::from(U256::MAX)),
        ("uint256", AbiValue::from(0u64)),
        ("int256", AbiValue::from(-123_456_789i64)),
        ("int256", AbiValue::Int(I256::from(i64::MAX))),
        ("address", AbiValue::Address(Address::from_hex(HOLDER).unwrap())),
        ("bool", AbiValue::Bool(true)),
        ("bool", AbiValue::Bool(false)),
        ("bytes4", AbiValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef])),
        ("bytes32", AbiValue::Bytes(vec![0x11; 32])),
    ];

    for (ty, value) in cases {
        let function = echo(ty);
        let call = encode_call(&function, std::slice::from_ref(&value)).unwrap();
        // 0x + 4-byte selector
        let result = &call[10..];
        assert_eq!(result.len(), 64, "{}", ty);
        let decoded = decode_result(&function, result).unwrap();
        assert_eq!(decoded, vec![value], "{}", ty);
    }
}

#[test]
fn test_mixed_static_dynamic_round_trip() {
    let types: Vec<ParamType> = ["uint256", "string", "address[]", "(bool,bytes)", "int24"]
        .iter()
        .map(|t| ParamType::parse(t).unwrap())
        .collect();
    let values = vec![
        AbiValue::from(42u64),
        AbiValue::from("hello ethkit"),
        AbiValue::List(vec![
            AbiValue::Address(Address::from_hex(HOLDER).unwrap()),
            AbiValue::Address(Address::zero()),
        ]),
        AbiValue::List(vec![AbiValue::Bool(true), AbiValue::Bytes(vec![1, 2, 3])]),
        AbiValue::Int(I256::from(-8_388_608i64)),
    ];

    let encoded = encode_params(&types, &values).unwrap();
    assert_eq!(encoded.len() % 32, 0);
    assert_eq!(decode_params(&types, &encoded).unwrap(), values);
}

#[test]
fn test_decode_truncated_offset() {
    let types = vec![ParamType::parse("bytes").unwrap()];
    let mut data = vec![0u8; 32];
    data[31] = 0x40;
    assert!(matches!(
        decode_params(&types, &data),
        Err(AbiError::InsufficientData(_))
    ));
}

// ==================== Parsing ====================

#[test]
fn test_artifact_object_accepted() {
    let artifact = format!(r#"{{"contractName": "Token", "abi": {}}}"#, ERC20_ABI);
    let abi = AbiParser::from_json_str(&artifact).unwrap();
    assert_eq!(abi, erc20());
}

#[test]
fn test_unknown_item_type_rejected() {
    let err = AbiParser::from_json_str(r#"[{"type": "modifier", "name": "onlyOwner"}]"#).unwrap_err();
    assert_eq!(err, AbiError::UnknownItemType("modifier".to_string()));
}

#[test]
fn test_missing_type_defaults_to_function() {
    let abi = AbiParser::from_json_str(
        r#"[{"name": "ping", "inputs": [], "outputs": [], "stateMutability": "pure"}]"#,
    )
    .unwrap();
    assert!(matches!(abi.items()[0], AbiItem::Function(_)));
}

#[test]
fn test_json_round_trip() {
    let abi = erc20();
    let text = abi.to_json().unwrap();
    let reparsed = AbiParser::from_json_str(&text).unwrap();

    let signatures = |abi: &AbiParser| -> Vec<String> {
        abi.functions().iter().map(|f| f.signature().unwrap()).collect()
    };
    assert_eq!(signatures(&reparsed), signatures(&abi));
    assert_eq!(reparsed.events().len(), 2);
}
