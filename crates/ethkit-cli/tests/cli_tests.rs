//! CLI integration tests for ethkit-cli
//!
//! Tests command parsing, offline codec commands, output formatting and
//! config handling. Nothing here needs a running node.

use std::path::Path;
use std::process::Command;

const TOKEN_ABI: &str = r#"[
    {"type": "constructor", "inputs": [{"name": "supply", "type": "uint256"}], "stateMutability": "nonpayable"},
    {"type": "function", "name": "transfer", "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}], "outputs": [{"name": "", "type": "bool"}], "stateMutability": "nonpayable"},
    {"type": "function", "name": "balanceOf", "inputs": [{"name": "owner", "type": "address"}], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
    {"type": "event", "name": "Transfer", "inputs": [{"name": "from", "type": "address", "indexed": true}, {"name": "to", "type": "address", "indexed": true}, {"name": "value", "type": "uint256", "indexed": false}], "anonymous": false},
    {"type": "error", "name": "InsufficientBalance", "inputs": [{"name": "needed", "type": "uint256"}]}
]"#;

/// Port 1 on loopback refuses connections
const DEAD_RPC: &str = "http://127.0.0.1:1";

/// Helper to run the CLI with arguments and an isolated config file
fn run_ethkit(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ethkit"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Token.json"), TOKEN_ABI).unwrap();
        Self { dir }
    }

    fn config(&self) -> std::path::PathBuf {
        self.dir.path().join("config.toml")
    }

    fn abi(&self) -> String {
        self.dir.path().join("Token.json").display().to_string()
    }

    fn run(&self, args: &[&str]) -> std::process::Output {
        run_ethkit(&self.config(), args)
    }
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let ws = Workspace::new();
    let output = ws.run(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["abi", "rlp", "query", "tx", "deploy", "config"] {
        assert!(text.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_cli_version() {
    let ws = Workspace::new();
    let output = ws.run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("ethkit"));
}

#[test]
fn test_cli_abi_help() {
    let ws = Workspace::new();
    let output = ws.run(&["abi", "--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["selector", "encode", "decode", "list"] {
        assert!(text.contains(command));
    }
}

// ==================== ABI Command Tests ====================

#[test]
fn test_abi_selector() {
    let ws = Workspace::new();
    let output = ws.run(&["abi", "selector", "transfer(address,uint256)"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "0xa9059cbb");
}

#[test]
fn test_abi_selector_json() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "abi", "selector", "balanceOf(address)"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["selector"], "0x70a08231");
    assert_eq!(json["signature"], "balanceOf(address)");
}

#[test]
fn test_abi_encode() {
    let ws = Workspace::new();
    let abi = ws.abi();
    let output = ws.run(&[
        "abi",
        "encode",
        "--abi",
        &abi,
        "--function",
        "transfer",
        "--args",
        r#"["0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d", 1000]"#,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout(&output).trim(),
        concat!(
            "0xa9059cbb",
            "000000000000000000000000742d35cc6634c0532925a3b844bc9e7595f0ab3d",
            "00000000000000000000000000000000000000000000000000000000000003e8"
        )
    );
}

#[test]
fn test_abi_encode_wrong_arg_count() {
    let ws = Workspace::new();
    let abi = ws.abi();
    let output = ws.run(&[
        "--json", "abi", "encode", "--abi", &abi, "--function", "transfer", "--args", "[1]",
    ]);
    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("argument count mismatch"));
}

#[test]
fn test_abi_decode() {
    let ws = Workspace::new();
    let abi = ws.abi();
    let data = format!("0x{:0>64}", "3e8");
    let output = ws.run(&[
        "--json", "abi", "decode", "--abi", &abi, "--function", "balanceOf", "--data", &data,
    ]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["function"], "balanceOf(address)");
    assert_eq!(json["values"], serde_json::json!([1000]));
}

#[test]
fn test_abi_list() {
    let ws = Workspace::new();
    let abi = ws.abi();
    let output = ws.run(&["--json", "abi", "list", "--abi", &abi]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["count"], 5);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items[0]["signature"], "constructor(uint256)");
    assert_eq!(items[1]["id"], "0xa9059cbb");
    assert_eq!(items[3]["kind"], "event");
}

#[test]
fn test_abi_missing_file() {
    let ws = Workspace::new();
    let output = ws.run(&["abi", "list", "--abi", "/nonexistent/Token.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

// ==================== RLP Command Tests ====================

#[test]
fn test_rlp_encode() {
    let ws = Workspace::new();
    let output = ws.run(&["rlp", "encode", r#"["0x01", "0x02", "0x03"]"#]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "0xc3010203");
}

#[test]
fn test_rlp_encode_empty_list_json() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "rlp", "encode", "[]"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["encoded"], "0xc0");
}

#[test]
fn test_rlp_encode_invalid_json() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "rlp", "encode", "[1,"]);
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["success"], false);
}

// ==================== Node Command Tests ====================

#[test]
fn test_query_unreachable_node() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--rpc-url", DEAD_RPC, "query", "chain-id"]);
    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Transport error"));
}

#[test]
fn test_query_nonce_invalid_address() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--rpc-url", DEAD_RPC, "query", "nonce", "0x1234"]);
    assert!(!output.status.success());
    assert!(stdout_json(&output)["error"]
        .as_str()
        .unwrap()
        .contains("Invalid address"));
}

#[test]
fn test_deploy_args_require_abi() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "deploy",
        "--bytecode",
        "0x6080",
        "--from",
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        "--args",
        "[1]",
    ]);
    assert!(!output.status.success());
}

// ==================== Config Tests ====================

#[test]
fn test_config_show_defaults() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "config", "--show"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["rpc_url"], "http://localhost:8545");
    assert_eq!(json["chain_id"], 1337);
}

#[test]
fn test_config_set_then_show() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "--set-rpc", "http://node:8545", "--set-chain-id", "31337"]);
    assert!(output.status.success());
    assert!(ws.config().exists());

    let output = ws.run(&["--json", "config", "--show"]);
    let json = stdout_json(&output);
    assert_eq!(json["rpc_url"], "http://node:8545");
    assert_eq!(json["chain_id"], 31337);
}

#[test]
fn test_rpc_url_flag_overrides_config() {
    let ws = Workspace::new();
    ws.run(&["config", "--set-rpc", "http://node:8545"]);
    let output = ws.run(&["--json", "--rpc-url", "http://other:8545", "config", "--show"]);
    assert_eq!(stdout_json(&output)["rpc_url"], "http://other:8545");
}

#[test]
fn test_debug_logs_stay_off_stdout() {
    let ws = Workspace::new();
    let output = ws.run(&["--json", "--log-level", "debug", "config", "--show"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["chain_id"], 1337);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("using defaults"));
    assert!(stderr.contains("Using RPC endpoint http://localhost:8545"));
}
