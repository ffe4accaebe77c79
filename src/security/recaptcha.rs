//! Google reCAPTCHA verification for uploads.

use std::time::Duration;

use crate::config::{RetryConfig, VerificationConfig};
use crate::observability::metrics;
use crate::resilience::retry_read;
use crate::security::{siteverify, VerificationOutcome, VerifyError};

/// Error code attached when a v3 score falls below the configured minimum.
pub const SCORE_TOO_LOW: &str = "score-too-low";

#[derive(Clone)]
pub struct RecaptchaVerifier {
    http: reqwest::Client,
    url: String,
    secret: Option<String>,
    min_score: Option<f64>,
    retries: RetryConfig,
}

impl RecaptchaVerifier {
    pub fn from_config(
        config: &VerificationConfig,
        retries: RetryConfig,
        timeout: Duration,
    ) -> Result<Self, VerifyError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: config.recaptcha_url.clone(),
            secret: config.recaptcha_secret.clone(),
            min_score: config.recaptcha_min_score,
            retries,
        })
    }

    pub async fn verify(&self, token: &str) -> Result<VerificationOutcome, VerifyError> {
        let secret = self.secret.as_deref().ok_or(VerifyError::NotConfigured("reCAPTCHA"))?;
        let form = [("secret", secret), ("response", token)];

        let mut outcome = retry_read(&self.retries, "recaptcha_verify", || {
            siteverify(&self.http, &self.url, &form)
        })
        .await
        .inspect_err(|_| metrics::record_verification("recaptcha", "error"))?;

        if let (true, Some(min), Some(score)) = (outcome.success, self.min_score, outcome.score) {
            if score < min {
                outcome.success = false;
                outcome.error_codes.push(SCORE_TOO_LOW.to_string());
            }
        }

        metrics::record_verification("recaptcha", if outcome.success { "success" } else { "failure" });
        Ok(outcome)
    }
}

impl std::fmt::Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaVerifier")
            .field("url", &self.url)
            .field("secret_configured", &self.secret.is_some())
            .field("min_score", &self.min_score)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_secret() {
        let verifier = RecaptchaVerifier::from_config(
            &VerificationConfig::default(),
            RetryConfig::default(),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = verifier.verify("token").await.unwrap_err();
        assert!(matches!(err, VerifyError::NotConfigured(_)));
    }
}
