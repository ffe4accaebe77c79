use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub cached_images: usize,
    pub cached_bytes: usize,
    pub verified_tokens: usize,
    pub release_enabled: bool,
}

pub async fn healthz(State(state): State<AppState>) -> Json<HealthStatus> {
    let (cached_images, cached_bytes) = state.inner.image_cache.stats();
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cached_images,
        cached_bytes,
        verified_tokens: state.inner.verified_tokens.len(),
        release_enabled: state.inner.submitter.is_some(),
    })
}
