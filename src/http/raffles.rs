//! Chain reads and unsigned transaction building for wallets.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::validation::is_object_id;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::raffle::{schedule::now_ms, CallError, RaffleCall};
use crate::sui::RaffleObject;

pub async fn get_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<String>,
) -> Result<Json<RaffleObject>, ApiError> {
    if !is_object_id(&raffle_id) {
        return Err(CallError::InvalidObjectId(raffle_id).into());
    }
    let raffle = state.inner.sui.get_raffle(&raffle_id).await?;
    Ok(Json(raffle))
}

#[derive(Debug, Deserialize)]
pub struct BuildTxRequest {
    /// Address of the wallet that will sign.
    pub sender: String,
    pub call: RaffleCall,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTxResponse {
    /// Base64 transaction bytes, ready for the wallet to sign.
    pub tx_bytes: String,
    pub target: String,
}

pub async fn build_transaction(
    State(state): State<AppState>,
    Json(request): Json<BuildTxRequest>,
) -> Result<Json<BuildTxResponse>, ApiError> {
    if !is_object_id(&request.sender) {
        return Err(CallError::InvalidObjectId(request.sender).into());
    }
    request.call.validate(now_ms())?;
    let call = request.call.to_move_call(&state.inner.config.raffle)?;

    let tx_bytes = state
        .inner
        .sui
        .move_call_bytes(&request.sender, &call, state.inner.config.sui.gas_budget)
        .await?;

    tracing::debug!(sender = %request.sender, target = %call.target(), "Built transaction");
    Ok(Json(BuildTxResponse {
        tx_bytes,
        target: call.target(),
    }))
}
