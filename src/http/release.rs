use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::raffle::RaffleCall;

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub digest: String,
    pub status: String,
}

/// Release a raffle with the server wallet.
pub async fn release_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<String>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let call = RaffleCall::Release { raffle_id: raffle_id.clone() }.to_move_call(&state.inner.config.raffle)?;
    let submitter = state
        .inner
        .submitter
        .as_ref()
        .ok_or(ApiError::NotConfigured("release wallet"))?;

    match submitter.submit(&call).await {
        Ok(result) => {
            metrics::record_release("success");
            tracing::info!(raffle_id = %raffle_id, digest = %result.digest, "Raffle released");
            Ok(Json(ReleaseResponse {
                digest: result.digest,
                status: result.status,
            }))
        }
        Err(e) => {
            let code = e.code();
            metrics::record_release(code.as_str());
            tracing::warn!(raffle_id = %raffle_id, code = %code, error = %e, "Raffle release failed");
            Err(e.into())
        }
    }
}
