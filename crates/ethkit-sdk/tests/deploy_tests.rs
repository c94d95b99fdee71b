//! Deployment integration tests for ethkit-sdk
//!
//! A canned compiler stands in for solc; the mock transport plays the node.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ethkit_sdk::abi::AbiValue;
use ethkit_sdk::compiler::CompilerDiagnostic;
use ethkit_sdk::{
    Address, Compiler, CompilerInput, CompilerOutput, DeployRequest, Deployer, DevAccount,
    EthClient, ImportResolver, JsonValue, ManualClock, MockTransport, SdkError,
};

const COUNTER_OUTPUT: &str = r#"{
    "contracts": {
        "Counter.sol": {
            "Counter": {
                "abi": [
                    {"type": "constructor", "inputs": [{"name": "start", "type": "uint256"}], "stateMutability": "nonpayable"},
                    {"type": "function", "name": "count", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"}
                ],
                "evm": {"bytecode": {"object": "6080604052"}}
            }
        }
    }
}"#;

const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Returns a fixed output and counts invocations
struct CannedCompiler {
    output: CompilerOutput,
    calls: Mutex<usize>,
}

impl CannedCompiler {
    fn new(output: CompilerOutput) -> Self {
        Self {
            output,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Compiler for CannedCompiler {
    async fn compile(
        &self,
        _input: &CompilerInput,
        _resolver: Option<&dyn ImportResolver>,
    ) -> Result<CompilerOutput, SdkError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.output.clone())
    }
}

fn sender() -> Address {
    DevAccount::anvil_defaults()[0].address.clone()
}

fn setup() -> (EthClient, MockTransport) {
    let transport = MockTransport::new();
    let client = EthClient::new(transport.clone()).with_clock(Arc::new(ManualClock::new()));
    (client, transport)
}

fn receipt(status: &str, contract_address: Option<&str>) -> JsonValue {
    let address = contract_address
        .map(|a| format!("\"{}\"", a))
        .unwrap_or_else(|| "null".to_string());
    JsonValue::from_str(&format!(
        r#"{{
            "transactionHash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x2",
            "status": "{}",
            "contractAddress": {},
            "logs": []
        }}"#,
        status, address
    ))
    .unwrap()
}

fn counter_request() -> DeployRequest {
    DeployRequest::source(
        CompilerInput::single("Counter.sol", "contract Counter {}"),
        "Counter",
        sender(),
    )
    .with_args(vec![AbiValue::from(7u64)])
}

// ==================== Pre-flight Failures ====================

#[tokio::test]
async fn test_compiler_error_blocks_deploy() {
    let (client, transport) = setup();
    let output = CompilerOutput {
        errors: vec![CompilerDiagnostic {
            severity: ethkit_sdk::compiler::Severity::Error,
            message: "ParserError: Expected ';'".to_string(),
            formatted_message: None,
        }],
        ..Default::default()
    };
    let compiler = CannedCompiler::new(output);

    let err = Deployer::new(&client)
        .with_compiler(&compiler)
        .deploy(&counter_request())
        .await
        .unwrap_err();

    match err {
        SdkError::Deployment(message) => assert!(message.contains("Expected ';'")),
        other => panic!("expected deployment error, got {:?}", other),
    }
    assert_eq!(compiler.calls(), 1);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_warnings_do_not_block() {
    let (client, _) = setup();
    let mut output = CompilerOutput::from_standard_json(COUNTER_OUTPUT).unwrap();
    output.errors.push(CompilerDiagnostic {
        severity: ethkit_sdk::compiler::Severity::Warning,
        message: "unused variable".to_string(),
        formatted_message: None,
    });
    let compiler = CannedCompiler::new(output);

    let prepared = Deployer::new(&client)
        .with_compiler(&compiler)
        .prepare(&counter_request())
        .await
        .unwrap();
    assert_eq!(&prepared.data[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
    assert_eq!(prepared.data.len(), 5 + 32);
    assert_eq!(prepared.data[36], 7);
}

#[tokio::test]
async fn test_missing_contract_in_output() {
    let (client, transport) = setup();
    let compiler = CannedCompiler::new(CompilerOutput::from_standard_json(COUNTER_OUTPUT).unwrap());
    let request = DeployRequest::source(
        CompilerInput::single("Counter.sol", "contract Counter {}"),
        "Token",
        sender(),
    );

    let err = Deployer::new(&client)
        .with_compiler(&compiler)
        .deploy(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Deployment(ref m) if m.contains("Token")));
    assert!(transport.requests().is_empty());
}

// ==================== Deploy ====================

#[tokio::test]
async fn test_deploy_from_source() {
    let (client, transport) = setup();
    transport.push_response("eth_getTransactionReceipt", JsonValue::Null);
    transport.set_response("eth_getTransactionReceipt", receipt("0x1", Some(CONTRACT)));
    let compiler = CannedCompiler::new(CompilerOutput::from_standard_json(COUNTER_OUTPUT).unwrap());

    let deployment = Deployer::new(&client)
        .with_compiler(&compiler)
        .with_polling(Duration::from_millis(10), Duration::from_secs(1))
        .deploy(&counter_request())
        .await
        .unwrap();

    assert_eq!(deployment.address.value(), CONTRACT);
    assert!(deployment.receipt.is_successful());
    let contract = deployment.contract().unwrap();
    assert!(contract.abi().function("count").len() == 1);

    let send = &transport.requests_for("eth_sendTransaction")[0];
    let params = &send.params[0];
    assert!(params.get("to").is_none());
    assert_eq!(params.get("gas"), Some(&JsonValue::from("0x2dc6c0"))); // 3_000_000
    let data = params.get("data").and_then(JsonValue::as_str).unwrap();
    assert!(data.starts_with("0x6080604052"));
    assert!(data.ends_with("07"));
}

#[tokio::test]
async fn test_deploy_bytecode_with_signer() {
    let (client, transport) = setup();
    transport.set_response("eth_getTransactionReceipt", receipt("0x1", Some(CONTRACT)));
    let wallet = DevAccount::anvil_defaults()[0].wallet().unwrap();

    let request = DeployRequest::bytecode("0x6080604052", sender()).with_gas(500_000);
    let deployment = Deployer::new(&client)
        .with_signer(&wallet)
        .deploy(&request)
        .await
        .unwrap();

    assert_eq!(deployment.address.value(), CONTRACT);
    assert!(deployment.abi.is_none());
    assert!(transport.requests_for("eth_sendTransaction").is_empty());
    assert_eq!(transport.requests_for("eth_sendRawTransaction").len(), 1);
    // Gas was given, so nothing is estimated
    assert!(transport.requests_for("eth_estimateGas").is_empty());
}

#[tokio::test]
async fn test_deploy_reverted() {
    let (client, transport) = setup();
    transport.set_response("eth_getTransactionReceipt", receipt("0x0", Some(CONTRACT)));

    let err = Deployer::new(&client)
        .deploy(&DeployRequest::bytecode("6080", sender()))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Deployment(ref m) if m.contains("reverted")));
}

#[tokio::test]
async fn test_deploy_without_contract_address() {
    let (client, transport) = setup();
    transport.set_response("eth_getTransactionReceipt", receipt("0x1", None));

    let err = Deployer::new(&client)
        .deploy(&DeployRequest::bytecode("6080", sender()))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Deployment(ref m) if m.contains("no contract address")));
}

#[tokio::test]
async fn test_deploy_times_out() {
    let (client, transport) = setup();
    transport.set_response("eth_getTransactionReceipt", JsonValue::Null);

    let err = Deployer::new(&client)
        .with_polling(Duration::from_millis(100), Duration::from_millis(250))
        .deploy(&DeployRequest::bytecode("6080", sender()))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Timeout { .. }));
}
