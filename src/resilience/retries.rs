//! Retry logic.
//!
//! # Responsibilities
//! - Execute an async operation up to a bounded number of attempts
//! - Sleep with exponential backoff + jitter between attempts
//! - Stop early on errors the caller marks as permanent

use std::future::Future;
use std::time::Duration;

use crate::resilience::backoff::calculate_backoff;

/// Bounded retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (minimum 1).
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, 0, 0)
    }

    fn delay(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 250, 4000)
    }
}

/// Result of a retried operation together with the attempts it took.
#[derive(Debug)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Run `op` until it succeeds, `retryable` rejects the error, or attempts run out.
///
/// `op` receives the 1-based attempt number.
pub async fn retry<F, Fut, T, E, R>(policy: RetryPolicy, retryable: R, mut op: F) -> Attempted<Result<T, E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                return Attempted { value: Ok(value), attempts: attempt };
            }
            Err(e) if attempt < policy.max_attempts && retryable(&e) => {
                let delay = policy.delay(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Attempted { value: Err(e), attempts: attempt };
            }
        }
    }
}
