//! Configuration loading from disk and the process environment.

use std::path::Path;
use std::fs;
use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env(String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env(e) => write!(f, "Environment error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay values from the environment onto `config`.
///
/// `lookup` abstracts `std::env::var` so tests can inject a map.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(env) = get("APP_ENV") {
        config.environment = match env.trim() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
    }
    if let Some(network) = get("SUI_NETWORK") {
        config.sui.network = network.parse().map_err(ConfigError::Env)?;
    }
    if let Some(url) = get("SUI_RPC_URL") {
        config.sui.rpc_url = Some(url);
    }
    if let Some(id) = get("RAFFLE_PACKAGE_ID") {
        config.raffle.package_id = id;
    }
    if let Some(id) = get("RAFFLE_CONFIG_OBJECT_ID") {
        config.raffle.config_object_id = id;
    }
    if let Some(jwt) = get("PINATA_JWT") {
        config.ipfs.jwt = Some(jwt);
    }
    if let Some(gateway) = get("PINATA_GATEWAY") {
        config.ipfs.gateway = gateway;
    }
    if let Some(secret) = get("RECAPTCHA_SECRET_KEY") {
        config.verification.recaptcha_secret = Some(secret);
    }
    if let Some(secret) = get("TURNSTILE_SECRET_KEY") {
        config.verification.turnstile_secret = Some(secret);
    }
    if let Some(hosts) = get("TURNSTILE_ALLOWED_HOSTNAMES") {
        config.verification.allowed_hostnames = hosts
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
    }
    if let Some(bind) = get("BIND_ADDRESS") {
        config.listener.bind_address = bind;
    }

    Ok(())
}
