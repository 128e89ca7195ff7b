//! Best-effort delivery of a run's notifications.

use std::sync::Arc;

use serde::Serialize;

use crate::alerting::NotificationRequest;
use crate::notify::{AdapterError, IssueTracker, SmsSender};
use crate::observability::metrics;
use crate::resilience::retries::{retry, RetryPolicy};

/// A request that could not be delivered.
#[derive(Debug, Serialize)]
pub struct DispatchFailure {
    pub request: NotificationRequest,
    pub error: String,
    pub attempts: u32,
}

/// Delivery outcome for one batch.
#[derive(Debug, Default, Serialize)]
pub struct DispatchReport {
    pub delivered: usize,
    /// Requests for channels that are not configured.
    pub skipped: usize,
    pub failed: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Routes requests to the configured providers.
pub struct Dispatcher {
    sms: Option<Arc<dyn SmsSender>>,
    issues: Option<Arc<dyn IssueTracker>>,
    retry: RetryPolicy,
}

impl Dispatcher {
    pub fn new(sms: Option<Arc<dyn SmsSender>>, issues: Option<Arc<dyn IssueTracker>>, retry: RetryPolicy) -> Self {
        Self { sms, issues, retry }
    }

    /// Deliver every request. Never fails; problems end up in the report.
    pub async fn dispatch(&self, requests: &[NotificationRequest]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for request in requests {
            let outcome = retry(self.retry, AdapterError::is_retryable, move |_| self.deliver(request)).await;
            let provider = self.provider(request);

            match outcome.value {
                Ok(()) => {
                    report.delivered += 1;
                    metrics::record_notification(request.kind(), "delivered");
                    tracing::debug!(kind = request.kind(), provider, "Notification delivered");
                }
                Err(AdapterError::NotConfigured(channel)) => {
                    report.skipped += 1;
                    metrics::record_notification(request.kind(), "skipped");
                    tracing::warn!(kind = request.kind(), channel, "No adapter for notification, skipping");
                }
                Err(e) => {
                    metrics::record_notification(request.kind(), "failed");
                    tracing::error!(
                        kind = request.kind(),
                        provider,
                        attempts = outcome.attempts,
                        error = %e,
                        "Failed to deliver notification"
                    );
                    report.failed.push(DispatchFailure {
                        request: request.clone(),
                        error: e.to_string(),
                        attempts: outcome.attempts,
                    });
                }
            }
        }

        report
    }

    /// Name of the adapter that handles `request`.
    fn provider(&self, request: &NotificationRequest) -> &str {
        let name = match request {
            NotificationRequest::SmsAlert { .. } => self.sms.as_ref().map(|s| s.name()),
            NotificationRequest::IssueReport { .. } | NotificationRequest::IssueResolve { .. } => {
                self.issues.as_ref().map(|i| i.name())
            }
        };
        name.unwrap_or("none")
    }

    async fn deliver(&self, request: &NotificationRequest) -> Result<(), AdapterError> {
        match request {
            NotificationRequest::SmsAlert { to, body } => {
                let sms = self.sms.as_ref().ok_or(AdapterError::NotConfigured("sms"))?;
                sms.send(to, body).await.map(|_| ())
            }
            NotificationRequest::IssueReport { title, body, labels } => {
                let issues = self.issues.as_ref().ok_or(AdapterError::NotConfigured("issues"))?;
                issues.open(title, body, labels).await.map(|_| ())
            }
            NotificationRequest::IssueResolve { title, comment } => {
                let issues = self.issues.as_ref().ok_or(AdapterError::NotConfigured("issues"))?;
                issues.resolve(title, comment).await.map(|_| ())
            }
        }
    }
}
