use axum::{extract::State, Json};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::request::ClientIp;
use crate::http::server::AppState;
use crate::security::{VerificationOutcome, VerifyError};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Verify a Turnstile token and remember it for the freshness window.
pub async fn verify_turnstile(
    State(state): State<AppState>,
    ClientIp(remote_ip): ClientIp,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerificationOutcome>, ApiError> {
    let verifier = state
        .inner
        .turnstile
        .as_ref()
        .ok_or(VerifyError::NotConfigured("Turnstile"))?;

    let token = request.token.trim();
    if token.is_empty() {
        return Err(ApiError::BadRequest("token must not be empty".to_string()));
    }

    let outcome = verifier.verify(token, remote_ip).await?;
    if !outcome.success {
        return Err(ApiError::VerificationFailed { error_codes: outcome.error_codes });
    }

    state.inner.verified_tokens.record(token);
    Ok(Json(outcome))
}
