//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Calculate the delay before retry `attempt` (1-based).
///
/// Doubles from `base_ms` per attempt, capped at `max_ms`, plus up to 10%
/// jitter so overlapping runs do not retry in lockstep.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b3 = calculate_backoff(3, 100, 2000);
        assert!(b3.as_millis() >= 400 && b3.as_millis() < 440);

        let capped = calculate_backoff(30, 100, 1000);
        assert!(capped.as_millis() >= 1000 && capped.as_millis() < 1100);
    }

    #[test]
    fn test_zeroth_attempt_has_no_delay() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
    }
}
