//! Bot-verification subsystem.
//!
//! # Data Flow
//! ```text
//! /api/v1/* request with x-turnstile-token
//!     → tokens.rs (fresh? skip the outbound call)
//!     → turnstile.rs (Cloudflare Siteverify + hostname allow-list)
//!     → tokens.rs (record success)
//!
//! POST /api/v1/ipfs/upload with recaptchaToken
//!     → recaptcha.rs (Google siteverify, optional minimum score)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a token that cannot be verified is rejected
//! - Transport failures to the verifier are retried; negative answers are not

pub mod recaptcha;
pub mod tokens;
pub mod turnstile;

pub use recaptcha::RecaptchaVerifier;
pub use tokens::{VerifiedTokens, TOKEN_FRESHNESS};
pub use turnstile::TurnstileVerifier;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::Retryable;

/// Errors talking to a verification provider.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{0} secret is not configured")]
    NotConfigured(&'static str),

    #[error("verifier returned status {0}")]
    Status(u16),

    #[error("verifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed verifier response: {0}")]
    Malformed(String),
}

impl Retryable for VerifyError {
    fn is_retryable(&self) -> bool {
        match self {
            VerifyError::Transport(_) => true,
            VerifyError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// Normalized verdict of a Siteverify call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub error_codes: Vec<String>,
}

/// Wire format shared by Cloudflare and Google siteverify endpoints.
#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    challenge_ts: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl From<SiteverifyResponse> for VerificationOutcome {
    fn from(r: SiteverifyResponse) -> Self {
        Self {
            success: r.success,
            hostname: r.hostname,
            challenge_ts: r.challenge_ts,
            score: r.score,
            error_codes: r.error_codes,
        }
    }
}

/// POST `form` to a siteverify endpoint once.
async fn siteverify(
    http: &reqwest::Client,
    url: &str,
    form: &[(&str, &str)],
) -> Result<VerificationOutcome, VerifyError> {
    let response = http.post(url).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(VerifyError::Status(status.as_u16()));
    }
    let body: SiteverifyResponse = response
        .json()
        .await
        .map_err(|e| VerifyError::Malformed(e.to_string()))?;
    Ok(body.into())
}
