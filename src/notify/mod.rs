//! Notification delivery.
//!
//! # Data Flow
//! ```text
//! RunReport.notifications
//!     → dispatcher.rs (route by kind, retry transient failures)
//!     → SmsSender     → twilio.rs (Messages API)   | log.rs (dry run)
//!     → IssueTracker  → github.rs (Issues API)     | log.rs (dry run)
//!     → DispatchReport (delivered / failed / skipped)
//! ```
//!
//! # Design Decisions
//! - Delivery is best-effort: failures are logged and counted, never raised
//! - Issues are matched by title so overlapping runs do not open duplicates
//! - Adapters receive credentials at construction; nothing reads the environment here

pub mod dispatcher;
pub mod github;
pub mod log;
pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::{Credentials, MonitorConfig};
use crate::error::AppError;

pub use dispatcher::{DispatchFailure, DispatchReport, Dispatcher};
pub use github::GitHubIssues;
pub use log::LogNotifier;
pub use twilio::TwilioSms;

/// Errors from a notification provider.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{provider} request failed: {message}")]
    Transport { provider: &'static str, message: String },

    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {message}")]
    InvalidResponse { provider: &'static str, message: String },

    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),
}

impl AdapterError {
    /// Transport failures, rate limits and server errors are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::Transport { .. } => true,
            AdapterError::Api { status, .. } => *status == 429 || *status >= 500,
            AdapterError::InvalidResponse { .. } | AdapterError::NotConfigured(_) => false,
        }
    }

    pub(crate) fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        AdapterError::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

/// Provider message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageId(pub String);

/// An issue in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRef {
    pub number: u64,
    pub url: String,
    /// False when an already-open issue with the same title was reused.
    pub created: bool,
}

/// Messaging provider.
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, to: &str, body: &str) -> Result<MessageId, AdapterError>;
}

/// Ticketing provider.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    fn name(&self) -> &str;

    /// Open an issue, or return the open issue that already has this title.
    async fn open(&self, title: &str, body: &str, labels: &[String]) -> Result<IssueRef, AdapterError>;

    /// Comment on and close the open issue with this title, if any.
    async fn resolve(&self, title: &str, comment: &str) -> Result<Option<IssueRef>, AdapterError>;
}

/// Build the dispatcher for this process.
///
/// In dry-run mode every channel logs instead of calling a provider.
/// Otherwise a channel that would send something must have credentials.
pub fn build_dispatcher(config: &MonitorConfig, credentials: &Credentials, dry_run: bool) -> Result<Dispatcher, AppError> {
    let retry = crate::resilience::retries::RetryPolicy::default();

    if dry_run {
        let sms = Arc::new(LogNotifier) as Arc<dyn SmsSender>;
        let issues = Arc::new(LogNotifier) as Arc<dyn IssueTracker>;
        return Ok(Dispatcher::new(Some(sms), Some(issues), retry));
    }

    let sms: Option<Arc<dyn SmsSender>> = if config.messaging.enabled && !config.messaging.to.is_empty() {
        let creds = credentials
            .messaging
            .clone()
            .ok_or(AppError::MissingCredential("TWILIO_ACCOUNT_SID / TWILIO_AUTH_TOKEN"))?;
        Some(Arc::new(TwilioSms::new(&config.messaging, creds)?) as Arc<dyn SmsSender>)
    } else {
        None
    };

    let issues: Option<Arc<dyn IssueTracker>> = if config.issues.enabled {
        let creds = credentials
            .issues
            .clone()
            .ok_or(AppError::MissingCredential("GITHUB_TOKEN / GITHUB_REPOSITORY"))?;
        Some(Arc::new(GitHubIssues::new(&config.issues, creds)?) as Arc<dyn IssueTracker>)
    } else {
        None
    };

    Ok(Dispatcher::new(sms, issues, retry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(AdapterError::Transport { provider: "twilio", message: "reset".into() }.is_retryable());
        assert!(AdapterError::Api { provider: "github", status: 503, body: String::new() }.is_retryable());
        assert!(AdapterError::Api { provider: "github", status: 429, body: String::new() }.is_retryable());
        assert!(!AdapterError::Api { provider: "github", status: 401, body: String::new() }.is_retryable());
        assert!(!AdapterError::NotConfigured("sms").is_retryable());
    }

    #[test]
    fn test_missing_credentials_are_setup_errors() {
        let mut config = MonitorConfig::default();
        config.messaging.from = "+15550000".into();
        config.messaging.to = vec!["+15551111".into()];

        let err = build_dispatcher(&config, &Credentials::default(), false).err().unwrap();
        assert!(matches!(err, AppError::MissingCredential(name) if name.starts_with("TWILIO")));
    }

    #[test]
    fn test_dry_run_needs_no_credentials() {
        let config = MonitorConfig::default();
        assert!(build_dispatcher(&config, &Credentials::default(), true).is_ok());
    }

    #[test]
    fn test_unused_channels_need_no_credentials() {
        let mut config = MonitorConfig::default();
        config.issues.enabled = false;
        assert!(build_dispatcher(&config, &Credentials::default(), false).is_ok());
    }
}
