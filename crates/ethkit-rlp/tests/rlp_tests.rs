use ethkit_primitives::{JsonValue, U256};
use ethkit_rlp::{decode_item, encode_item, encode_json, RlpItem};
use proptest::prelude::*;

fn item_strategy() -> impl Strategy<Value = RlpItem> {
    let leaf = prop::collection::vec(any::<u8>(), 0..80).prop_map(RlpItem::Bytes);
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(RlpItem::List)
    })
}

proptest! {
    #[test]
    fn bytes_and_lists_decode_back(item in item_strategy()) {
        let encoded = encode_item(&item);
        prop_assert_eq!(decode_item(&encoded).unwrap(), item);
    }

    #[test]
    fn uint_matches_minimal_bytes(value in any::<u128>()) {
        let uint = U256::from(value);
        let be = value.to_be_bytes();
        let start = be.iter().position(|&b| b != 0).unwrap_or(be.len());
        let expected = encode_item(&RlpItem::Bytes(be[start..].to_vec()));
        prop_assert_eq!(encode_item(&RlpItem::Uint(uint)), expected);
    }

    #[test]
    fn hex_string_matches_raw_bytes(bytes in prop::collection::vec(any::<u8>(), 0..100)) {
        let text = format!("0x{}", hex::encode(&bytes));
        prop_assert_eq!(
            encode_item(&RlpItem::Str(text)),
            encode_item(&RlpItem::Bytes(bytes))
        );
    }
}

#[test]
fn json_transaction_shape() {
    // [nonce, gasPrice, gas, to, value, data]
    let value = JsonValue::from_str(
        r#"[9, 20000000000, 21000, "0x3535353535353535353535353535353535353535", 1000000000000000000, "0x"]"#,
    )
    .unwrap();
    let encoded = hex::encode(encode_json(&value));
    assert_eq!(
        encoded,
        "e9098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080"
    );
}
