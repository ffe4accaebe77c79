//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Returns every error found,
//! not just the first.

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// True for a `0x`-prefixed hex string of 1..=64 digits.
pub fn is_object_id(id: &str) -> bool {
    match id.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, message: String| errors.push(ValidationError { field, message });

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        push("listener.bind_address", format!("'{}' is not a socket address", config.listener.bind_address));
    }
    if config.listener.max_body_bytes < config.ipfs.max_upload_bytes {
        push("listener.max_body_bytes", "must be at least ipfs.max_upload_bytes".to_string());
    }
    if !config.raffle.package_id.is_empty() && !is_object_id(&config.raffle.package_id) {
        push("raffle.package_id", format!("'{}' is not a 0x-prefixed object id", config.raffle.package_id));
    }
    if !config.raffle.config_object_id.is_empty() && !is_object_id(&config.raffle.config_object_id) {
        push("raffle.config_object_id", format!("'{}' is not a 0x-prefixed object id", config.raffle.config_object_id));
    }
    if config.raffle.module.is_empty() {
        push("raffle.module", "must not be empty".to_string());
    }
    if let Some(url) = &config.sui.rpc_url {
        if url::Url::parse(url).is_err() {
            push("sui.rpc_url", format!("'{}' is not a URL", url));
        }
    }
    if config.ipfs.gateway.trim().is_empty() {
        push("ipfs.gateway", "must not be empty".to_string());
    }
    if url::Url::parse(&config.ipfs.api_url).is_err() {
        push("ipfs.api_url", format!("'{}' is not a URL", config.ipfs.api_url));
    }
    if config.cache.max_entries == 0 {
        push("cache.max_entries", "must be greater than zero".to_string());
    }
    if config.cache.max_bytes == 0 {
        push("cache.max_bytes", "must be greater than zero".to_string());
    }
    if config.retries.max_attempts == 0 {
        push("retries.max_attempts", "must be at least 1".to_string());
    }
    if config.timeouts.request_secs == 0 || config.timeouts.upstream_secs == 0 {
        push("timeouts", "timeouts must be greater than zero".to_string());
    }
    if config.environment.is_production() && config.verification.turnstile_secret.is_none() {
        push("verification.turnstile_secret", "TURNSTILE_SECRET_KEY is required in production".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
