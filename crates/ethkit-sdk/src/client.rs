//! EthClient - main RPC client

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethkit_primitives::{parse_quantity, Address, JsonValue, U256};
use tracing::{debug, warn};

use crate::abi::{encode_function_data, AbiFunction, AbiValue};
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::signer::Signer;
use crate::transport::{MockTransport, Transport};
use crate::tx_builder::TxBuilder;
use crate::types::{BlockId, RpcRequest, TransactionParams, TransactionReceipt};
use crate::SdkError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// JSON-RPC client for an Ethereum-compatible node
pub struct EthClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    config: ClientConfig,
    next_id: AtomicU64,
}

impl EthClient {
    /// Create a client with a custom transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            clock: Arc::new(SystemClock::new()),
            config: ClientConfig::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a client over HTTP
    #[cfg(feature = "http")]
    pub fn connect(url: &str) -> Self {
        Self::new(HttpTransport::new(url)).with_config(ClientConfig {
            rpc_url: url.to_string(),
            ..Default::default()
        })
    }

    /// Create an HTTP client from configuration
    #[cfg(feature = "http")]
    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(HttpTransport::new(&config.rpc_url)).with_config(config)
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::new(MockTransport::new())
    }

    /// Replace the time source used for receipt polling
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one JSON-RPC request and return its `result`
    pub async fn request(&self, method: &str, params: Vec<JsonValue>) -> Result<JsonValue, SdkError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!(method, id, "rpc request");

        let request = RpcRequest::new(id, method, params);
        let response = self.transport.send(&request).await?;

        if let Some(error) = response.error {
            debug!(method, id, code = error.code, "rpc error");
            return Err(SdkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.ok_or_else(|| {
            SdkError::InvalidResponse(format!("{}: response has neither result nor error", method))
        })
    }

    // ==================== Chain Info ====================

    /// Get the chain ID
    pub async fn chain_id(&self) -> Result<u64, SdkError> {
        self.request_u64("eth_chainId", vec![]).await
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<u64, SdkError> {
        self.request_u64("eth_blockNumber", vec![]).await
    }

    /// Get the current gas price
    pub async fn get_gas_price(&self) -> Result<U256, SdkError> {
        self.request_quantity("eth_gasPrice", vec![]).await
    }

    /// Get the suggested EIP-1559 tip
    pub async fn max_priority_fee_per_gas(&self) -> Result<U256, SdkError> {
        self.request_quantity("eth_maxPriorityFeePerGas", vec![]).await
    }

    // ==================== Account Queries ====================

    /// Get the balance of an address
    pub async fn get_balance(&self, address: &Address, block: BlockId) -> Result<U256, SdkError> {
        self.request_quantity("eth_getBalance", vec![address_param(address), block_param(block)])
            .await
    }

    /// Get the nonce (transaction count) of an address
    pub async fn get_transaction_count(&self, address: &Address, block: BlockId) -> Result<u64, SdkError> {
        self.request_u64(
            "eth_getTransactionCount",
            vec![address_param(address), block_param(block)],
        )
        .await
    }

    /// Get the code at an address
    pub async fn get_code(&self, address: &Address, block: BlockId) -> Result<Vec<u8>, SdkError> {
        let result = self
            .request("eth_getCode", vec![address_param(address), block_param(block)])
            .await?;
        parse_hex_bytes("eth_getCode", &result)
    }

    // ==================== Transaction Submission ====================

    /// Send a transaction signed by the node (`eth_sendTransaction`)
    pub async fn send_transaction(&self, params: &TransactionParams) -> Result<String, SdkError> {
        let result = self
            .request("eth_sendTransaction", vec![JsonValue::from_serializable(params)?])
            .await?;
        let hash = expect_string("eth_sendTransaction", &result)?;
        debug!(hash = %hash, "transaction broadcast");
        Ok(hash)
    }

    /// Send a raw transaction (RLP-encoded bytes)
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, SdkError> {
        let hex = format!("0x{}", hex::encode(raw));
        let result = self
            .request("eth_sendRawTransaction", vec![JsonValue::from(hex)])
            .await?;
        let hash = expect_string("eth_sendRawTransaction", &result)?;
        debug!(hash = %hash, "raw transaction broadcast");
        Ok(hash)
    }

    /// Fill unset fields from the node, sign locally and broadcast.
    ///
    /// Nonce comes from the pending count, gas from estimation. A builder
    /// with only a gas price is sent as a legacy transaction; otherwise the
    /// fee cap defaults to twice the gas price plus the tip.
    pub async fn send_signed<S: Signer + ?Sized>(
        &self,
        builder: TxBuilder,
        signer: &S,
    ) -> Result<String, SdkError> {
        let mut builder = builder;
        let from = signer.address();

        if builder.chain_id == 0 {
            builder.chain_id = self.chain_id().await?;
        }
        if builder.nonce.is_none() {
            builder.nonce = Some(self.get_transaction_count(from, BlockId::Pending).await?);
        }
        if builder.gas_limit.is_none() {
            builder.gas_limit = Some(self.estimate_gas(&builder.to_params(from)).await?);
        }

        let signed = if builder.is_legacy() {
            builder.sign_legacy(signer)?
        } else {
            let tip = match builder.max_priority_fee_per_gas {
                Some(tip) => tip,
                None => self.max_priority_fee_per_gas().await?,
            };
            builder.max_priority_fee_per_gas = Some(tip);
            if builder.max_fee_per_gas.is_none() {
                let base = self.get_gas_price().await?;
                builder.max_fee_per_gas = Some(base.saturating_mul(U256::from(2u64)).saturating_add(tip));
            }
            builder.sign_eip1559(signer)?
        };

        debug!(hash = %signed.hash, from = %from, "transaction signed");
        self.send_raw_transaction(&signed.raw).await
    }

    // ==================== Call & Estimation ====================

    /// Execute a call (read-only, does not create transaction)
    pub async fn call(&self, params: &TransactionParams, block: BlockId) -> Result<String, SdkError> {
        let result = self
            .request(
                "eth_call",
                vec![JsonValue::from_serializable(params)?, block_param(block)],
            )
            .await?;
        expect_string("eth_call", &result)
    }

    /// Encode a call to `function`, execute it against `to` and decode the result
    pub async fn call_function(
        &self,
        to: &Address,
        function: &AbiFunction,
        args: &[AbiValue],
        block: BlockId,
    ) -> Result<Vec<AbiValue>, SdkError> {
        let data = encode_function_data(function, args)?;
        let params = TransactionParams::to(to.clone()).with_data(data);
        let result = self.call(&params, block).await?;
        Ok(function.decode_result(&result)?)
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, params: &TransactionParams) -> Result<u64, SdkError> {
        self.request_u64("eth_estimateGas", vec![JsonValue::from_serializable(params)?])
            .await
    }

    // ==================== Receipts ====================

    /// Fetch a receipt; `None` while the transaction is pending
    pub async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>, SdkError> {
        const METHOD: &str = "eth_getTransactionReceipt";
        let result = self.request(METHOD, vec![JsonValue::from(hash)]).await?;
        match result {
            JsonValue::Null => Ok(None),
            JsonValue::Object(_) => TransactionReceipt::from_json(&result)
                .map(Some)
                .map_err(|e| SdkError::InvalidResponse(format!("{}: {}", METHOD, e))),
            other => Err(SdkError::InvalidResponse(format!(
                "{}: expected an object or null, got {}",
                METHOD,
                other.kind()
            ))),
        }
    }

    /// Poll until the transaction is mined or `timeout` has elapsed.
    ///
    /// A mined receipt is returned whatever its status. The last sleep is
    /// clamped so the loop gives up at the deadline.
    pub async fn wait_for_receipt(
        &self,
        hash: &str,
        polling_interval: Duration,
        timeout: Duration,
    ) -> Result<TransactionReceipt, SdkError> {
        let start = self.clock.now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if let Some(receipt) = self.get_transaction_receipt(hash).await? {
                debug!(hash, attempts, status = ?receipt.status, "transaction mined");
                return Ok(receipt);
            }

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= timeout {
                warn!(hash, attempts, "timed out waiting for receipt");
                return Err(SdkError::Timeout {
                    elapsed,
                    limit: timeout,
                });
            }

            debug!(hash, attempts, "transaction pending");
            self.clock.sleep(polling_interval.min(timeout - elapsed)).await;
        }
    }

    /// [`wait_for_receipt`](Self::wait_for_receipt) with the configured interval and timeout
    pub async fn wait_for_receipt_default(&self, hash: &str) -> Result<TransactionReceipt, SdkError> {
        self.wait_for_receipt(hash, self.config.polling_interval(), self.config.receipt_timeout())
            .await
    }

    // ==================== Helpers ====================

    async fn request_quantity(&self, method: &str, params: Vec<JsonValue>) -> Result<U256, SdkError> {
        let result = self.request(method, params).await?;
        parse_hex_quantity(method, &result)
    }

    async fn request_u64(&self, method: &str, params: Vec<JsonValue>) -> Result<u64, SdkError> {
        let value = self.request_quantity(method, params).await?;
        if value > U256::from(u64::MAX) {
            return Err(SdkError::InvalidResponse(format!(
                "{}: quantity {} does not fit in 64 bits",
                method, value
            )));
        }
        Ok(value.low_u64())
    }
}

impl std::fmt::Debug for EthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

fn address_param(address: &Address) -> JsonValue {
    JsonValue::from(address.to_hex())
}

fn block_param(block: BlockId) -> JsonValue {
    JsonValue::from(block.as_param())
}

fn expect_string(method: &str, value: &JsonValue) -> Result<String, SdkError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        SdkError::InvalidResponse(format!("{}: expected a string, got {}", method, value.kind()))
    })
}

fn parse_hex_quantity(method: &str, value: &JsonValue) -> Result<U256, SdkError> {
    let s = value.as_str().ok_or_else(|| {
        SdkError::InvalidResponse(format!("{}: expected a hex quantity, got {}", method, value.kind()))
    })?;
    parse_quantity(s)
        .ok_or_else(|| SdkError::InvalidResponse(format!("{}: invalid hex quantity '{}'", method, s)))
}

fn parse_hex_bytes(method: &str, value: &JsonValue) -> Result<Vec<u8>, SdkError> {
    let s = expect_string(method, value)?;
    let digits = s.strip_prefix("0x").unwrap_or(&s);
    hex::decode(digits).map_err(|e| SdkError::InvalidResponse(format!("{}: {}", method, e)))
}
