//! Error type returned by every handler.
//!
//! Renders as `{ "error": CODE, "message": text }` with an HTTP status chosen
//! per variant. Chain errors carry the classified code from `raffle::errors`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ipfs::IpfsError;
use crate::raffle::CallError;
use crate::security::VerifyError;
use crate::sui::SuiError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing x-turnstile-token header")]
    MissingToken,

    #[error("bot verification failed")]
    VerificationFailed { error_codes: Vec<String> },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Ipfs(#[from] IpfsError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Sui(#[from] SuiError),

    #[error(transparent)]
    Call(#[from] CallError),
}

impl ApiError {
    /// HTTP status and stable error code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            ApiError::VerificationFailed { .. } => (StatusCode::FORBIDDEN, "VERIFICATION_FAILED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            ApiError::Ipfs(e) => match e {
                IpfsError::InvalidCid(_) => (StatusCode::BAD_REQUEST, "INVALID_CID"),
                IpfsError::InvalidMime(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "INVALID_FILE_TYPE"),
                IpfsError::EmptyFile => (StatusCode::BAD_REQUEST, "EMPTY_FILE"),
                IpfsError::TooLarge { .. } | IpfsError::BodyTooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE")
                }
                IpfsError::NotAnImage(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "NOT_AN_IMAGE"),
                IpfsError::NotConfigured => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
                IpfsError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                IpfsError::Status(_) | IpfsError::Transport(_) | IpfsError::Malformed(_) => {
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
                }
            },
            ApiError::Verify(VerifyError::NotConfigured(_)) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            ApiError::Verify(_) => (StatusCode::SERVICE_UNAVAILABLE, "VERIFIER_UNAVAILABLE"),
            ApiError::Sui(SuiError::NotAvailable(_)) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            ApiError::Sui(e) => {
                let code = e.code();
                let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, code.as_str())
            }
            ApiError::Call(CallError::MissingConfig(_)) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
            ApiError::Call(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "Request failed");
        }

        let mut body = json!({ "error": code, "message": self.to_string() });
        match &self {
            ApiError::VerificationFailed { error_codes } => {
                body["errorCodes"] = json!(error_codes);
            }
            ApiError::Sui(e) if !matches!(e, SuiError::NotAvailable(_)) => {
                // Chain messages are noisy; clients get the friendly text plus the raw detail.
                body["message"] = json!(e.code().user_message());
                body["detail"] = json!(e.to_string());
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
