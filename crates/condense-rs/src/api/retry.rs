//! Bounded retry with exponential backoff.
//!
//! [`retry_with_backoff`] runs an async model call up to
//! [`RetryConfig::max_attempts`] times, sleeping
//! [`RetryConfig::delay_for_attempt`] between attempts. Only
//! [`ModelError::Transient`] failures are retried; a permanent failure or the
//! last transient one ends the loop.
//!
//! [`is_transient_error`] and [`is_permanent_error`] classify the string
//! errors produced by the HTTP client (429, 5xx and network failures are
//! transient; 400/401/403/404/422 are permanent).

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::ModelError;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 doubles the delay each attempt).
    pub multiplier: f64,
    /// Scale delays by a deterministic factor to spread concurrent retries.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a config with the given number of attempts. Uses default delays.
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            ..Default::default()
        }
    }

    /// A config that retries without sleeping. Useful in tests.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Calculate the delay after a failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            let jitter_factor = match attempt % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                _ => 0.85,
            };
            Duration::from_secs_f64(capped * jitter_factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Outcome of a retried call that never succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted {
    /// Attempts actually made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last: ModelError,
}

/// Run `call` until it succeeds, fails permanently, or attempts run out.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut call: F,
) -> Result<T, RetryExhausted>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if attempt < max_attempts && e.is_transient() {
                    let delay = config.delay_for_attempt(attempt - 1);
                    warn!(
                        "{label}: {e} (attempt {attempt}/{max_attempts}). Retrying in {delay:?}..."
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
            }
        }
    }
}

/// Whether an error string indicates a transient (retryable) failure.
pub fn is_transient_error(error: &str) -> bool {
    let transient_statuses = ["429", "500", "502", "503", "504"];
    if transient_statuses
        .iter()
        .any(|s| error.contains(&format!("HTTP {s}")))
    {
        return true;
    }

    let lower = error.to_lowercase();
    [
        "request failed:",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "broken pipe",
        "network",
        "overloaded",
    ]
    .iter()
    .any(|p| lower.contains(p))
}

/// Whether an error is a permanent (non-retryable) failure.
pub fn is_permanent_error(error: &str) -> bool {
    [
        "HTTP 400",
        "HTTP 401",
        "HTTP 403",
        "HTTP 404",
        "HTTP 422",
        "invalid",
        "bad request",
        "unauthorized",
    ]
    .iter()
    .any(|p| error.contains(p))
}

/// Classify a client error string into a [`ModelError`].
pub fn classify_error(error: String) -> ModelError {
    if is_transient_error(&error) && !is_permanent_error(&error) {
        ModelError::Transient(error)
    } else {
        ModelError::Permanent(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_config_makes_three_attempts() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(4));
    }

    #[test]
    fn delay_increases_exponentially() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            ..RetryConfig::with_attempts(5)
        };
        let d0 = config.delay_for_attempt(0);
        let d1 = config.delay_for_attempt(1);
        let d2 = config.delay_for_attempt(2);

        assert!(d1 > d0, "d1={d1:?} should be > d0={d0:?}");
        assert!(d2 > d1, "d2={d2:?} should be > d1={d1:?}");
    }

    #[test]
    fn delay_capped_at_max() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(8));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(10));
    }

    #[test]
    fn jitter_reduces_delay() {
        let jittered = RetryConfig {
            jitter: true,
            ..RetryConfig::default()
        };
        let plain = RetryConfig::default();
        assert!(jittered.delay_for_attempt(2) <= plain.delay_for_attempt(2));
    }

    #[test]
    fn transient_errors_detected() {
        assert!(is_transient_error("OpenRouter API HTTP 429: rate limited"));
        assert!(is_transient_error("OpenRouter API HTTP 502: bad gateway"));
        assert!(is_transient_error("request failed: connection reset"));
        assert!(is_transient_error("request failed: timed out"));
    }

    #[test]
    fn permanent_errors_detected() {
        assert!(is_permanent_error("OpenRouter API HTTP 400: bad request"));
        assert!(is_permanent_error("OpenRouter API HTTP 401: unauthorized"));
    }

    #[test]
    fn classify_prefers_permanent() {
        assert!(classify_error("OpenRouter API HTTP 503: overloaded".into()).is_transient());
        assert!(!classify_error("OpenRouter API HTTP 400: bad request".into()).is_transient());
        assert!(!classify_error("some random error".into()).is_transient());
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&RetryConfig::immediate(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ModelError::Transient("busy".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&RetryConfig::immediate(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ModelError::Transient("still busy".into())) }
        })
        .await;
        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.last, ModelError::Transient("still busy".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&RetryConfig::immediate(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ModelError::Permanent("bad request".into())) }
        })
        .await;
        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
