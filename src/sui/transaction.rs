//! Server-signed transaction submission.
//!
//! # Responsibilities
//! - Build transaction bytes for a Move call with the wallet as sender
//! - Sign and execute them
//! - Surface on-chain failures as classified errors
//!
//! Submission is a write path and is never retried.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;

use crate::raffle::MoveCall;
use crate::sui::client::SuiClient;
use crate::sui::types::{ExecutionResult, SuiError, SuiResult};
use crate::sui::wallet::Wallet;

/// Signs and submits transactions with the release wallet.
#[derive(Clone)]
pub struct TxSubmitter {
    client: SuiClient,
    wallet: Arc<Wallet>,
    gas_budget: u64,
}

impl TxSubmitter {
    pub fn new(client: SuiClient, wallet: Wallet, gas_budget: u64) -> Self {
        Self {
            client,
            wallet: Arc::new(wallet),
            gas_budget,
        }
    }

    /// Address that pays for and signs submitted calls.
    pub fn sender(&self) -> &str {
        self.wallet.address()
    }

    /// Build, sign and execute `call`. A transaction that executes but fails
    /// on-chain is returned as [`SuiError::Execution`].
    pub async fn submit(&self, call: &MoveCall) -> SuiResult<ExecutionResult> {
        let tx_bytes = self
            .client
            .move_call_bytes(self.wallet.address(), call, self.gas_budget)
            .await?;
        let raw = BASE64
            .decode(&tx_bytes)
            .map_err(|e| SuiError::Malformed(format!("txBytes is not base64: {}", e)))?;

        let signature = self.wallet.sign_transaction(&raw);
        let result = self.client.execute(&tx_bytes, &[signature]).await?;

        if !result.is_success() {
            let reason = result.error.clone().unwrap_or_else(|| result.status.clone());
            tracing::warn!(digest = %result.digest, target = %call.target(), reason = %reason, "Transaction failed on-chain");
            return Err(SuiError::Execution(reason));
        }

        tracing::info!(digest = %result.digest, target = %call.target(), "Transaction executed");
        Ok(result)
    }
}

impl std::fmt::Debug for TxSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSubmitter")
            .field("client", &self.client)
            .field("sender", &self.wallet.address())
            .field("gas_budget", &self.gas_budget)
            .finish()
    }
}
