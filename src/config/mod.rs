//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: network, ids, secrets)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow running from the environment alone
//! - Secrets come only from the environment and are never serialized

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, Environment, GatewayConfig, IpfsConfig, ListenerConfig, ObservabilityConfig,
    RaffleConfig, RetryConfig, SuiConfig, SuiNetwork, TimeoutConfig, VerificationConfig,
};
