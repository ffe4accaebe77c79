//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Secrets are never read from the file; see `loader::apply_env_overrides`.

use serde::{Deserialize, Serialize};

/// Root configuration for the raffle gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Deployment environment.
    pub environment: Environment,

    /// Sui network and RPC settings.
    pub sui: SuiConfig,

    /// On-chain raffle contract identifiers.
    pub raffle: RaffleConfig,

    /// IPFS pinning and gateway settings.
    pub ipfs: IpfsConfig,

    /// Image cache limits.
    pub cache: CacheConfig,

    /// Bot-verification settings (Turnstile, reCAPTCHA).
    pub verification: VerificationConfig,

    /// Retry configuration for read paths.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment. Production enables hostname allow-listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes (multipart uploads included).
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Sui network selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuiNetwork {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Localnet,
}

impl SuiNetwork {
    /// Public fullnode URL for the network.
    pub fn default_rpc_url(self) -> &'static str {
        match self {
            SuiNetwork::Mainnet => "https://fullnode.mainnet.sui.io:443",
            SuiNetwork::Testnet => "https://fullnode.testnet.sui.io:443",
            SuiNetwork::Devnet => "https://fullnode.devnet.sui.io:443",
            SuiNetwork::Localnet => "http://127.0.0.1:9000",
        }
    }
}

impl std::str::FromStr for SuiNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(SuiNetwork::Mainnet),
            "testnet" => Ok(SuiNetwork::Testnet),
            "devnet" => Ok(SuiNetwork::Devnet),
            "localnet" => Ok(SuiNetwork::Localnet),
            other => Err(format!("unknown Sui network '{}'", other)),
        }
    }
}

/// Sui JSON-RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SuiConfig {
    /// Network to target.
    pub network: SuiNetwork,

    /// Explicit RPC URL; falls back to the network's public fullnode.
    pub rpc_url: Option<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas budget for server-signed transactions, in MIST.
    pub gas_budget: u64,
}

impl SuiConfig {
    /// Effective RPC endpoint.
    pub fn endpoint(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }
}

impl Default for SuiConfig {
    fn default() -> Self {
        Self {
            network: SuiNetwork::Testnet,
            rpc_url: None,
            rpc_timeout_secs: 10,
            gas_budget: 50_000_000,
        }
    }
}

/// Identifiers of the deployed raffle contract.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RaffleConfig {
    /// Move package id.
    pub package_id: String,

    /// Shared configuration object of the raffle module.
    pub config_object_id: String,

    /// Move module name.
    pub module: String,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            package_id: String::new(),
            config_object_id: String::new(),
            module: "raffle".to_string(),
        }
    }
}

/// IPFS pinning (Pinata) and gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IpfsConfig {
    /// Pinata API base URL.
    pub api_url: String,

    /// Dedicated gateway host (e.g., "example.mypinata.cloud") or full base URL.
    pub gateway: String,

    /// Pinata JWT. Populated from `PINATA_JWT`.
    #[serde(skip_serializing)]
    pub jwt: Option<String>,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl IpfsConfig {
    /// Base URL of the gateway, with scheme.
    pub fn gateway_base(&self) -> String {
        let gw = self.gateway.trim_end_matches('/');
        if gw.starts_with("http://") || gw.starts_with("https://") {
            gw.to_string()
        } else {
            format!("https://{}", gw)
        }
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.pinata.cloud".to_string(),
            gateway: "gateway.pinata.cloud".to_string(),
            jwt: None,
            max_upload_bytes: crate::ipfs::upload::MAX_UPLOAD_BYTES,
        }
    }
}

/// Image cache limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached images.
    pub max_entries: usize,

    /// Maximum cumulative bytes held by the cache.
    pub max_bytes: usize,

    /// Time-to-live of an entry in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 500,
            max_bytes: 100 * 1024 * 1024,
            ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Bot-verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Cloudflare Siteverify endpoint.
    pub turnstile_url: String,

    /// Turnstile secret. Populated from `TURNSTILE_SECRET_KEY`.
    #[serde(skip_serializing)]
    pub turnstile_secret: Option<String>,

    /// Hostnames accepted in production. Empty disables the check.
    pub allowed_hostnames: Vec<String>,

    /// Google reCAPTCHA endpoint.
    pub recaptcha_url: String,

    /// reCAPTCHA secret. Populated from `RECAPTCHA_SECRET_KEY`.
    #[serde(skip_serializing)]
    pub recaptcha_secret: Option<String>,

    /// Minimum score for reCAPTCHA v3 responses.
    pub recaptcha_min_score: Option<f64>,

    /// Freshness window of a verified Turnstile token, in seconds.
    pub token_freshness_secs: u64,

    /// Paths under `/api/v1` that bypass the Turnstile gate. An entry also
    /// covers its sub-paths (`/api/v1/release` covers `/api/v1/release/0x1`).
    pub exempt_paths: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            turnstile_url: "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string(),
            turnstile_secret: None,
            allowed_hostnames: Vec::new(),
            recaptcha_url: "https://www.google.com/recaptcha/api/siteverify".to_string(),
            recaptcha_secret: None,
            recaptcha_min_score: None,
            token_freshness_secs: 5 * 60,
            exempt_paths: vec![
                "/api/v1/turnstile/verify".to_string(),
                "/api/v1/ipfs/retrieve".to_string(),
                "/api/v1/ipfs/upload".to_string(),
                "/api/v1/release".to_string(),
            ],
        }
    }
}

/// Retry configuration for read paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first.
    pub max_attempts: u32,

    /// Linear backoff step in milliseconds (delay = step * attempt).
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for handling an incoming request, in seconds.
    pub request_secs: u64,

    /// Timeout for outbound HTTP calls (gateway, Pinata, verifiers), in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_secs: 15,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
