//! Cloudflare Turnstile verification.

use std::net::IpAddr;
use std::time::Duration;

use crate::config::{Environment, RetryConfig, VerificationConfig};
use crate::observability::metrics;
use crate::resilience::retry_read;
use crate::security::{siteverify, VerificationOutcome, VerifyError};

/// Error code attached when a token was issued for a hostname outside the allow-list.
pub const HOSTNAME_NOT_ALLOWED: &str = "hostname-not-allowed";

/// Verifies Turnstile tokens against Cloudflare Siteverify.
#[derive(Clone)]
pub struct TurnstileVerifier {
    http: reqwest::Client,
    url: String,
    secret: String,
    allowed_hostnames: Vec<String>,
    enforce_hostnames: bool,
    retries: RetryConfig,
}

impl TurnstileVerifier {
    /// Build a verifier, or `None` when no secret is configured.
    pub fn from_config(
        config: &VerificationConfig,
        environment: Environment,
        retries: RetryConfig,
        timeout: Duration,
    ) -> Result<Option<Self>, VerifyError> {
        let Some(secret) = config.turnstile_secret.clone() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Some(Self {
            http,
            url: config.turnstile_url.clone(),
            secret,
            allowed_hostnames: config.allowed_hostnames.clone(),
            enforce_hostnames: environment.is_production(),
            retries,
        }))
    }

    /// Verify `token`. A negative answer is `Ok` with `success == false`.
    pub async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> Result<VerificationOutcome, VerifyError> {
        let ip = remote_ip.map(|ip| ip.to_string());
        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = ip.as_deref() {
            form.push(("remoteip", ip));
        }

        let result = retry_read(&self.retries, "turnstile_verify", || {
            siteverify(&self.http, &self.url, &form)
        })
        .await;

        let mut outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::record_verification("turnstile", "error");
                metrics::record_upstream_error("turnstile");
                return Err(e);
            }
        };

        if outcome.success && !self.hostname_allowed(outcome.hostname.as_deref()) {
            tracing::warn!(hostname = ?outcome.hostname, "Turnstile token issued for a hostname outside the allow-list");
            outcome.success = false;
            outcome.error_codes.push(HOSTNAME_NOT_ALLOWED.to_string());
        }

        metrics::record_verification("turnstile", if outcome.success { "success" } else { "failure" });
        Ok(outcome)
    }

    /// Production with a non-empty allow-list requires an exact hostname match.
    pub fn hostname_allowed(&self, hostname: Option<&str>) -> bool {
        if !self.enforce_hostnames || self.allowed_hostnames.is_empty() {
            return true;
        }
        match hostname {
            Some(h) => self.allowed_hostnames.iter().any(|allowed| allowed.eq_ignore_ascii_case(h)),
            None => false,
        }
    }
}

impl std::fmt::Debug for TurnstileVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnstileVerifier")
            .field("url", &self.url)
            .field("allowed_hostnames", &self.allowed_hostnames)
            .field("enforce_hostnames", &self.enforce_hostnames)
            .finish()
    }
}
