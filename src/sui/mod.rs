//! Sui integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (RELEASE_PRIVATE_KEY, SUI_NETWORK / SUI_RPC_URL)
//!     → wallet.rs (key loading, intent signing)
//!     → client.rs (JSON-RPC with timeouts, retried reads)
//!     → transaction.rs (build, sign, execute)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::SuiClient;
pub use transaction::TxSubmitter;
pub use types::{ExecutionResult, RaffleObject, SuiError, SuiResult};
pub use wallet::{Wallet, PRIVATE_KEY_ENV_VAR};
