//! Transport layer for RPC communication

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use ethkit_primitives::JsonValue;
use thiserror::Error;

use crate::types::{RpcRequest, RpcResponse};

/// Failure to deliver a request or read its response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status when the server answered with a non-2xx code
    pub status: Option<u16>,
    /// Error message
    pub message: String,
}

impl TransportError {
    /// Server answered with a non-success status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// No HTTP answer at all (connect, TLS, body read, decode)
    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Transport trait for RPC communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one JSON-RPC request and return its response envelope
    async fn send(&self, request: &RpcRequest) -> Result<RpcResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &RpcRequest) -> Result<RpcResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Scripted reply for [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// `result` member (may be `Null`)
    Result(JsonValue),
    /// `error` member
    Error {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },
    /// Neither `result` nor `error`
    Empty,
    /// Transport-level failure
    Failure(TransportError),
}

impl MockReply {
    fn into_response(self, id: u64) -> Result<RpcResponse, TransportError> {
        match self {
            MockReply::Result(value) => Ok(RpcResponse::success(id, value)),
            MockReply::Error { code, message } => Ok(RpcResponse::failure(id, code, message)),
            MockReply::Empty => Ok(RpcResponse::empty(id)),
            MockReply::Failure(e) => Err(e),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    queued: HashMap<String, VecDeque<MockReply>>,
    sticky: HashMap<String, MockReply>,
    requests: Vec<RpcRequest>,
}

/// Mock transport for testing.
///
/// Lookup order per method: queued replies (consumed), then the sticky reply,
/// then built-in defaults, then a `-32601` error. Clones share state.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    defaults: Arc<HashMap<String, JsonValue>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();

        // Default responses for common methods
        defaults.insert("eth_chainId".to_string(), JsonValue::from("0x539")); // 1337
        defaults.insert("eth_gasPrice".to_string(), JsonValue::from("0x3b9aca00")); // 1 gwei
        defaults.insert("eth_maxPriorityFeePerGas".to_string(), JsonValue::from("0x3b9aca00"));
        defaults.insert("eth_blockNumber".to_string(), JsonValue::from("0x100")); // Block 256
        defaults.insert("eth_getBalance".to_string(), JsonValue::from("0xde0b6b3a7640000")); // 1 ETH
        defaults.insert("eth_getTransactionCount".to_string(), JsonValue::from("0x0"));
        defaults.insert("eth_estimateGas".to_string(), JsonValue::from("0x5208")); // 21000
        defaults.insert(
            "eth_sendRawTransaction".to_string(),
            JsonValue::from("0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b"),
        );
        defaults.insert(
            "eth_sendTransaction".to_string(),
            JsonValue::from("0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b"),
        );
        defaults.insert("eth_call".to_string(), JsonValue::from("0x"));
        defaults.insert("eth_getCode".to_string(), JsonValue::from("0x"));

        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            defaults: Arc::new(defaults),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every call to `method` with `result`
    pub fn set_response(&self, method: &str, result: JsonValue) {
        self.set_reply(method, MockReply::Result(result));
    }

    /// Answer every call to `method` with `reply`
    pub fn set_reply(&self, method: &str, reply: MockReply) {
        self.state().sticky.insert(method.to_string(), reply);
    }

    /// Answer the next call to `method` with `result`
    pub fn push_response(&self, method: &str, result: JsonValue) {
        self.push_reply(method, MockReply::Result(result));
    }

    /// Answer the next call to `method` with `reply`
    pub fn push_reply(&self, method: &str, reply: MockReply) {
        self.state()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.state().requests.clone()
    }

    /// Requests received for one method
    pub fn requests_for(&self, method: &str) -> Vec<RpcRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Clear scripted replies and the request log
    pub fn clear_responses(&self) {
        *self.state() = MockState::default();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &RpcRequest) -> Result<RpcResponse, TransportError> {
        let reply = {
            let mut state = self.state();
            state.requests.push(request.clone());

            let queued = state
                .queued
                .get_mut(&request.method)
                .and_then(VecDeque::pop_front);
            queued.or_else(|| state.sticky.get(&request.method).cloned())
        };

        // Fall back to defaults
        let reply = reply
            .or_else(|| self.defaults.get(&request.method).cloned().map(MockReply::Result))
            .unwrap_or_else(|| MockReply::Error {
                code: -32601,
                message: format!("Method not found: {}", request.method),
            });

        reply.into_response(request.id)
    }
}

/// HTTP transport for real RPC communication
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Create a transport whose requests give up after `timeout`
    pub fn with_timeout(url: &str, timeout: std::time::Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::connection(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RpcRequest) -> Result<RpcResponse, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::http(
                status.as_u16(),
                format!("{}: {}", status, body.trim()),
            ));
        }

        response
            .json::<RpcResponse>()
            .await
            .map_err(|e| TransportError::connection(format!("invalid JSON-RPC body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str) -> RpcRequest {
        RpcRequest::new(1, method, vec![])
    }

    #[tokio::test]
    async fn test_mock_transport_default_responses() {
        let transport = MockTransport::new();

        let response = transport.send(&request("eth_chainId")).await.unwrap();
        assert_eq!(response.result, Some(JsonValue::from("0x539")));

        let response = transport.send(&request("eth_gasPrice")).await.unwrap();
        assert_eq!(response.result, Some(JsonValue::from("0x3b9aca00")));
    }

    #[tokio::test]
    async fn test_mock_transport_custom_response() {
        let transport = MockTransport::new();
        transport.set_response("eth_chainId", JsonValue::from("0x5"));

        let response = transport.send(&request("eth_chainId")).await.unwrap();
        assert_eq!(response.result, Some(JsonValue::from("0x5")));
    }

    #[tokio::test]
    async fn test_queued_replies_take_precedence() {
        let transport = MockTransport::new();
        transport.set_response("eth_getTransactionReceipt", JsonValue::Null);
        transport.push_response("eth_getTransactionReceipt", JsonValue::from("first"));

        let first = transport.send(&request("eth_getTransactionReceipt")).await.unwrap();
        let second = transport.send(&request("eth_getTransactionReceipt")).await.unwrap();
        assert_eq!(first.result, Some(JsonValue::from("first")));
        assert_eq!(second.result, Some(JsonValue::Null));
        assert_eq!(transport.requests_for("eth_getTransactionReceipt").len(), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_method() {
        let transport = MockTransport::new();
        let response = transport.send(&request("unknown_method")).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_mock_failure_and_shared_state() {
        let transport = MockTransport::new();
        let handle = transport.clone();
        handle.push_reply("eth_call", MockReply::Failure(TransportError::http(500, "boom")));

        let err = transport.send(&request("eth_call")).await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(handle.requests().len(), 1);

        handle.clear_responses();
        assert!(transport.requests().is_empty());
    }
}
