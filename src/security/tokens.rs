//! Ledger of recently verified Turnstile tokens.
//!
//! A token that passed Siteverify stays fresh for a fixed window (five minutes
//! by default). Within the window the gate skips the outbound call; once the
//! window lapses the entry is dropped and the token must be verified again.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Default freshness window of a verified token.
pub const TOKEN_FRESHNESS: Duration = Duration::from_secs(5 * 60);

const PURGE_THRESHOLD: usize = 10_000;

/// Concurrent map of token → time of successful verification.
#[derive(Debug)]
pub struct VerifiedTokens {
    inner: DashMap<String, Instant>,
    freshness: Duration,
}

impl VerifiedTokens {
    pub fn new(freshness: Duration) -> Self {
        Self {
            inner: DashMap::new(),
            freshness,
        }
    }

    /// True if `token` was verified less than the freshness window ago.
    /// A stale entry is removed.
    pub fn is_fresh(&self, token: &str) -> bool {
        let verified_at = match self.inner.get(token) {
            Some(entry) => *entry.value(),
            None => return false,
        };
        if verified_at.elapsed() < self.freshness {
            true
        } else {
            self.inner.remove(token);
            tracing::debug!("Verification token expired, re-verification required");
            false
        }
    }

    /// Record a successful verification of `token` at the current instant.
    pub fn record(&self, token: &str) {
        self.record_at(token, Instant::now());
    }

    /// Record a verification at an explicit instant.
    pub fn record_at(&self, token: &str, verified_at: Instant) {
        if self.inner.len() >= PURGE_THRESHOLD {
            self.purge_expired();
        }
        self.inner.insert(token.to_string(), verified_at);
    }

    /// Drop every entry past the freshness window.
    pub fn purge_expired(&self) {
        let freshness = self.freshness;
        self.inner.retain(|_, verified_at| verified_at.elapsed() < freshness);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for VerifiedTokens {
    fn default() -> Self {
        Self::new(TOKEN_FRESHNESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token() {
        let tokens = VerifiedTokens::default();
        assert!(!tokens.is_fresh("t1"));
        tokens.record("t1");
        assert!(tokens.is_fresh("t1"));
        assert!(!tokens.is_fresh("t2"));
    }

    #[test]
    fn test_token_older_than_five_minutes_expires() {
        let tokens = VerifiedTokens::default();
        let Some(six_minutes_ago) = Instant::now().checked_sub(Duration::from_secs(6 * 60)) else {
            // Monotonic clock too close to its origin to go back six minutes.
            return;
        };
        tokens.record_at("old", six_minutes_ago);
        assert!(!tokens.is_fresh("old"));
        assert!(tokens.is_empty(), "stale entry should be dropped");
    }

    #[test]
    fn test_token_just_inside_window() {
        let tokens = VerifiedTokens::default();
        let Some(four_minutes_ago) = Instant::now().checked_sub(Duration::from_secs(4 * 60)) else {
            return;
        };
        tokens.record_at("recent", four_minutes_ago);
        assert!(tokens.is_fresh("recent"));
    }

    #[test]
    fn test_purge_expired() {
        let tokens = VerifiedTokens::new(Duration::from_millis(50));
        tokens.record("a");
        tokens.record("b");
        std::thread::sleep(Duration::from_millis(80));
        tokens.record("c");
        tokens.purge_expired();
        assert_eq!(tokens.len(), 1);
        assert!(tokens.is_fresh("c"));
    }
}
