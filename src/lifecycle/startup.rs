//! Startup orchestration.
//!
//! Configuration is loaded and validated first, then the release key, then the
//! chain is probed. The listener binds last so traffic only arrives when ready.

use crate::config::GatewayConfig;
use crate::sui::{SuiClient, SuiError, Wallet, PRIVATE_KEY_ENV_VAR};

/// Load the release wallet from the environment.
///
/// A missing key disables the release endpoint. A malformed key is a startup
/// error; its contents are never logged.
pub fn load_release_wallet() -> Result<Option<Wallet>, SuiError> {
    let present = std::env::var(PRIVATE_KEY_ENV_VAR)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    if !present {
        tracing::warn!("{} not set, raffle release is disabled", PRIVATE_KEY_ENV_VAR);
        return Ok(None);
    }

    Wallet::from_env().map(Some)
}

/// Log the chain identifier of the configured RPC endpoint.
///
/// Failure is logged, not fatal: the fullnode may come up after the gateway.
pub async fn probe_chain(config: &GatewayConfig) {
    let client = match SuiClient::new(&config.sui, config.retries.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build Sui client for probe");
            return;
        }
    };
    match client.chain_identifier().await {
        Ok(chain) => tracing::info!(rpc = %client.url(), chain = %chain, "Connected to Sui"),
        Err(e) => tracing::warn!(rpc = %client.url(), error = %e, "Sui RPC unreachable at startup"),
    }
}
