//! Solidity ABI handling
//!
//! This module provides functionality for:
//! - Parsing contract ABI JSON into typed items
//! - Encoding function calls and constructor arguments
//! - Decoding return values, revert data and event logs
//!
//! # Example
//!
//! ```rust
//! use ethkit_sdk::abi::{AbiParser, AbiValue};
//!
//! let abi = AbiParser::from_json_str(r#"[{
//!     "type": "function",
//!     "name": "balanceOf",
//!     "inputs": [{"name": "owner", "type": "address"}],
//!     "outputs": [{"name": "", "type": "uint256"}],
//!     "stateMutability": "view"
//! }]"#).unwrap();
//!
//! let balance_of = abi.function("balanceOf")[0];
//! let data = balance_of
//!     .encode_call(&[AbiValue::from("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d")])
//!     .unwrap();
//! assert!(data.starts_with("0x70a08231"));
//!
//! let values = balance_of
//!     .decode_result("0x00000000000000000000000000000000000000000000000000000000000003e8")
//!     .unwrap();
//! assert_eq!(values, vec![AbiValue::from(1000u64)]);
//! ```

mod decode;
mod encode;
mod error;
mod parser;
mod schema;
mod types;

pub use decode::{decode_params, decode_result};
pub use encode::{encode_call, encode_constructor, encode_function_data, encode_params};
pub use error::AbiError;
pub use parser::AbiParser;
pub use schema::{
    AbiConstructor, AbiErrorDef, AbiEvent, AbiFallback, AbiFunction, AbiItem, AbiParameter,
    AbiReceive, StateMutability,
};
pub use types::{AbiValue, ParamType, TypeCategory};
