//! Sui JSON-RPC client with timeout and retry handling.
//!
//! # Responsibilities
//! - Issue JSON-RPC 2.0 requests to a fullnode
//! - Read objects (retried with linear backoff)
//! - Build unsigned transaction bytes for a Move call
//! - Execute signed transactions (never retried)

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{RetryConfig, SuiConfig};
use crate::observability::metrics;
use crate::raffle::MoveCall;
use crate::resilience::retry_read;
use crate::sui::types::{ExecutionResult, RaffleObject, SuiError, SuiResult};

/// Sui fullnode JSON-RPC client.
#[derive(Clone)]
pub struct SuiClient {
    http: reqwest::Client,
    url: String,
    retries: RetryConfig,
    next_id: Arc<AtomicU64>,
}

impl SuiClient {
    pub fn new(config: &SuiConfig, retries: RetryConfig) -> SuiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.endpoint(),
            retries,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON-RPC request and return its `result`.
    async fn call(&self, method: &'static str, params: Value) -> SuiResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .inspect_err(|_| metrics::record_upstream_error("sui_rpc"))?;

        let status = response.status();
        if !status.is_success() {
            metrics::record_upstream_error("sui_rpc");
            return Err(SuiError::Status(status.as_u16()));
        }

        let mut envelope: Value = response
            .json()
            .await
            .map_err(|e| SuiError::Malformed(e.to_string()))?;

        if let Some(error) = envelope.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            tracing::debug!(method, code, message = %message, "RPC returned an error");
            return Err(SuiError::Rpc { code, message });
        }

        envelope
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| SuiError::Malformed(format!("{} response has no result", method)))
    }

    /// Chain identifier of the connected network.
    pub async fn chain_identifier(&self) -> SuiResult<String> {
        let result = retry_read(&self.retries, "sui_chain_identifier", || {
            self.call("sui_getChainIdentifier", json!([]))
        })
        .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SuiError::Malformed("chain identifier is not a string".to_string()))
    }

    /// Read a raffle object with its Move fields.
    pub async fn get_raffle(&self, object_id: &str) -> SuiResult<RaffleObject> {
        let params = json!([object_id, { "showContent": true, "showType": true }]);
        let result = retry_read(&self.retries, "sui_get_object", || {
            self.call("sui_getObject", params.clone())
        })
        .await?;
        RaffleObject::from_rpc(object_id, &result)
    }

    /// Build unsigned, base64-encoded transaction bytes for `call` sent by `sender`.
    pub async fn move_call_bytes(&self, sender: &str, call: &MoveCall, gas_budget: u64) -> SuiResult<String> {
        let params = json!([
            sender,
            call.package,
            call.module,
            call.function,
            call.type_arguments,
            call.arguments,
            Value::Null,
            gas_budget.to_string(),
        ]);
        let result = self.call("unsafe_moveCall", params).await?;
        result
            .get("txBytes")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SuiError::Malformed("unsafe_moveCall returned no txBytes".to_string()))
    }

    /// Submit signed transaction bytes and wait for local execution.
    pub async fn execute(&self, tx_bytes: &str, signatures: &[String]) -> SuiResult<ExecutionResult> {
        let params = json!([
            tx_bytes,
            signatures,
            { "showEffects": true },
            "WaitForLocalExecution",
        ]);
        let result = self.call("sui_executeTransactionBlock", params).await?;
        ExecutionResult::from_rpc(&result)
    }
}

impl std::fmt::Debug for SuiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiClient")
            .field("url", &self.url)
            .field("max_attempts", &self.retries.max_attempts)
            .finish()
    }
}
