//! Target checking subsystem.
//!
//! # Data Flow
//! ```text
//! Target (target.rs)
//!     → URL validation (malformed → ConfigError, no request sent)
//!     → probe.rs (GET/HEAD with deadline, optional confirmation retries)
//!     → status classification against expected_status (default 2xx)
//!     → CheckResult (result.rs)
//! ```
//!
//! # Design Decisions
//! - Every error is converted into a failing CheckResult; nothing here
//!   returns `Err` to the run loop
//! - Configuration errors are distinct from outages

pub mod probe;
pub mod result;
pub mod target;

use std::time::Instant;

use chrono::Utc;

pub use probe::{HttpProbe, Probe};
pub use result::{CheckError, CheckResult, NetworkErrorKind};
pub use target::{targets_from_config, Target};

use crate::resilience::retries::{retry, RetryPolicy};

/// Check a single target once, retrying transient failures per `policy`.
pub async fn check_target<P: Probe + ?Sized>(probe: &P, target: &Target, policy: RetryPolicy) -> CheckResult {
    let timestamp = Utc::now();
    let started = Instant::now();

    let url = match target.parse_url() {
        Ok(url) => url,
        Err(error) => {
            return CheckResult {
                target: target.clone(),
                success: false,
                status_code: None,
                latency: started.elapsed(),
                error: Some(error),
                timestamp,
                attempts: 0,
            };
        }
    };

    let url = &url;
    let outcome = retry(policy, |e: &CheckError| !e.is_config(), move |_| async move {
        let status = probe.probe(target.method, url, target.timeout).await?;
        if target.accepts(status) {
            Ok(status)
        } else {
            Err(CheckError::StatusMismatch {
                expected: target.expected_status,
                actual: status,
            })
        }
    })
    .await;

    let latency = started.elapsed();
    match outcome.value {
        Ok(status) => CheckResult {
            target: target.clone(),
            success: true,
            status_code: Some(status),
            latency,
            error: None,
            timestamp,
            attempts: outcome.attempts,
        },
        Err(error) => {
            let status_code = match &error {
                CheckError::StatusMismatch { actual, .. } => Some(*actual),
                _ => None,
            };
            CheckResult {
                target: target.clone(),
                success: false,
                status_code,
                latency,
                error: Some(error),
                timestamp,
                attempts: outcome.attempts,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeMethod;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use url::Url;

    /// Replays a fixed sequence of answers, repeating the last one.
    struct Scripted {
        answers: Vec<Result<u16, CheckError>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(answers: Vec<Result<u16, CheckError>>) -> Self {
            Self { answers, calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl Probe for Scripted {
        async fn probe(&self, _: ProbeMethod, _: &Url, _: Duration) -> Result<u16, CheckError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            self.answers[i.min(self.answers.len() - 1)].clone()
        }
    }

    fn target() -> Target {
        Target::new("https://example.com/", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_expected_status_is_success() {
        let probe = Scripted::new(vec![Ok(200)]);
        let result = check_target(&probe, &target().with_expected_status(200), RetryPolicy::none()).await;
        assert!(result.success);
        assert_eq!(result.status_code, Some(200));
        assert_eq!(result.error, None);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_wrong_status_is_mismatch() {
        let probe = Scripted::new(vec![Ok(503)]);
        let result = check_target(&probe, &target(), RetryPolicy::none()).await;
        assert!(!result.success);
        assert_eq!(result.status_code, Some(503));
        assert_eq!(result.outcome(), "StatusMismatchError");
    }

    #[tokio::test]
    async fn test_network_error_is_failure() {
        let probe = Scripted::new(vec![Err(CheckError::network(NetworkErrorKind::Dns, "no such host"))]);
        let result = check_target(&probe, &target(), RetryPolicy::none()).await;
        assert!(!result.success);
        assert_eq!(result.status_code, None);
        assert_eq!(result.outcome(), "NetworkError");
    }

    #[tokio::test]
    async fn test_malformed_url_never_probes() {
        let probe = Scripted::new(vec![Ok(200)]);
        let bad = Target::new("not a url", Duration::from_secs(1));
        let result = check_target(&probe, &bad, RetryPolicy::new(3, 1, 1)).await;

        assert!(!result.success);
        assert!(result.is_config_error());
        assert_eq!(result.attempts, 0);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retries_confirm_transient_failure() {
        let probe = Scripted::new(vec![Ok(502), Ok(200)]);
        let result = check_target(&probe, &target(), RetryPolicy::new(2, 1, 1)).await;
        assert!(result.success);
        assert_eq!(result.attempts, 2);
    }
}
