//! Turnstile gate for `/api/v1/*`.
//!
//! Every API request outside the exempt prefixes must carry a valid
//! `x-turnstile-token`. Tokens verified within the freshness window are
//! accepted without another Siteverify call.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::http::error::ApiError;
use crate::http::request::client_ip;
use crate::http::server::AppState;

/// Header carrying the client's Turnstile token.
pub const TURNSTILE_HEADER: &str = "x-turnstile-token";

const API_PREFIX: &str = "/api/v1/";

/// True when `path` is under `/api/v1/` and not exempt.
pub fn requires_token(path: &str, exempt: &[String]) -> bool {
    path.starts_with(API_PREFIX) && !exempt.iter().any(|entry| covers(entry, path))
}

/// `entry` matches itself and anything below it, on a segment boundary.
fn covers(entry: &str, path: &str) -> bool {
    let entry = entry.trim_end_matches('/');
    match path.strip_prefix(entry) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub async fn turnstile_gate(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if !requires_token(path, &state.inner.config.verification.exempt_paths) {
        return next.run(req).await;
    }

    // Without a secret the gate is open; startup refuses this in production.
    let Some(verifier) = state.inner.turnstile.as_ref() else {
        return next.run(req).await;
    };

    let token = match req.headers().get(TURNSTILE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return ApiError::MissingToken.into_response(),
    };

    if state.inner.verified_tokens.is_fresh(&token) {
        return next.run(req).await;
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let remote_ip = client_ip(req.headers(), peer);

    match verifier.verify(&token, remote_ip).await {
        Ok(outcome) if outcome.success => {
            state.inner.verified_tokens.record(&token);
            next.run(req).await
        }
        Ok(outcome) => {
            tracing::info!(path = %req.uri().path(), error_codes = ?outcome.error_codes, "Turnstile verification rejected");
            ApiError::VerificationFailed { error_codes: outcome.error_codes }.into_response()
        }
        Err(e) => ApiError::Verify(e).into_response(),
    }
}
