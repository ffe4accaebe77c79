//! Retry logic for read paths.
//!
//! Gateway fetches, Siteverify transport failures and chain object reads are
//! retried a fixed number of times with linear backoff. Writes (pinning,
//! transaction execution) are never passed through here.

use std::future::Future;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Run `op` up to `config.max_attempts` times, sleeping between attempts.
///
/// Stops early on success or on an error that reports itself as not retryable.
pub async fn retry_read<T, E, F, Fut>(config: &RetryConfig, what: &'static str, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && e.is_retryable() => {
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                tracing::info!(operation = what, attempt, delay = ?delay, error = %e, "Retrying read");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::warn!(operation = what, attempt, error = %e, "Read failed");
                return Err(e);
            }
        }
    }
}
