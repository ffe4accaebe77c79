//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::raffle::{classify, CallError, ErrorCode};
use crate::resilience::Retryable;

/// Errors that can occur during Sui operations.
#[derive(Debug, Error)]
pub enum SuiError {
    /// JSON-RPC error object returned by the fullnode.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Fullnode answered with a non-success HTTP status.
    #[error("RPC endpoint returned status {0}")]
    Status(u16),

    /// Request could not be sent or timed out.
    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response did not have the expected shape.
    #[error("Malformed RPC response: {0}")]
    Malformed(String),

    /// Object does not exist or was deleted.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Transaction was executed but failed on-chain.
    #[error("Transaction failed: {0}")]
    Execution(String),

    /// Call could not be constructed.
    #[error(transparent)]
    Call(#[from] CallError),

    /// Feature disabled by missing configuration.
    #[error("Not available: {0}")]
    NotAvailable(&'static str),
}

impl SuiError {
    /// Stable code for clients, derived from the error kind or its message.
    pub fn code(&self) -> ErrorCode {
        match self {
            SuiError::Transport(_) | SuiError::Status(_) => ErrorCode::Network,
            SuiError::ObjectNotFound(_) => ErrorCode::ObjectNotFound,
            SuiError::Call(_) => ErrorCode::InvalidInput,
            other => classify(&other.to_string()),
        }
    }
}

impl Retryable for SuiError {
    fn is_retryable(&self) -> bool {
        match self {
            SuiError::Transport(_) => true,
            SuiError::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

/// Result type for Sui operations.
pub type SuiResult<T> = Result<T, SuiError>;

/// Outcome of `sui_executeTransactionBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub digest: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    pub(crate) fn from_rpc(result: &Value) -> SuiResult<Self> {
        let digest = result
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| SuiError::Malformed("missing digest".to_string()))?
            .to_string();
        let status = result.pointer("/effects/status/status").and_then(Value::as_str);
        let error = result
            .pointer("/effects/status/error")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            digest,
            status: status.unwrap_or("unknown").to_string(),
            error,
        })
    }
}

/// A raffle object as read from the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleObject {
    pub object_id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Move struct fields as returned by `showContent`.
    pub fields: Value,
}

impl RaffleObject {
    /// Parse a `sui_getObject` result.
    pub(crate) fn from_rpc(id: &str, result: &Value) -> SuiResult<Self> {
        if let Some(err) = result.get("error") {
            tracing::debug!(object_id = id, error = %err, "Object lookup returned an error");
            return Err(SuiError::ObjectNotFound(id.to_string()));
        }
        let data = result
            .get("data")
            .ok_or_else(|| SuiError::Malformed("missing data".to_string()))?;
        let text = |ptr: &str| data.pointer(ptr).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            object_id: text("/objectId").unwrap_or_else(|| id.to_string()),
            version: text("/version").unwrap_or_default(),
            type_name: text("/type")
                .or_else(|| text("/content/type"))
                .unwrap_or_default(),
            fields: data.pointer("/content/fields").cloned().unwrap_or(Value::Null),
        })
    }
}
