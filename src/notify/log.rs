//! Dry-run adapter that only logs.

use async_trait::async_trait;

use crate::notify::{AdapterError, IssueRef, IssueTracker, MessageId, SmsSender};

/// Logs every notification instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl SmsSender for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, to: &str, body: &str) -> Result<MessageId, AdapterError> {
        tracing::info!(to = %to, body = %body, "[dry-run] would send message");
        Ok(MessageId("dry-run".to_string()))
    }
}

#[async_trait]
impl IssueTracker for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn open(&self, title: &str, body: &str, labels: &[String]) -> Result<IssueRef, AdapterError> {
        tracing::info!(title = %title, labels = ?labels, body = %body, "[dry-run] would open issue");
        Ok(IssueRef {
            number: 0,
            url: String::new(),
            created: true,
        })
    }

    async fn resolve(&self, title: &str, comment: &str) -> Result<Option<IssueRef>, AdapterError> {
        tracing::info!(title = %title, comment = %comment, "[dry-run] would close issue");
        Ok(None)
    }
}
