//! Notification requests and their rendering.
//!
//! The runner only produces requests; `notify::Dispatcher` delivers them.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::alerting::policy::AlertEvent;
use crate::check::CheckResult;
use crate::config::{IssueConfig, MessagingConfig};

/// A notification the adapters should deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationRequest {
    SmsAlert {
        to: String,
        body: String,
    },
    IssueReport {
        title: String,
        body: String,
        labels: Vec<String>,
    },
    /// Close the open issue with `title`, leaving `comment`.
    IssueResolve {
        title: String,
        comment: String,
    },
}

impl NotificationRequest {
    /// Label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationRequest::SmsAlert { .. } => "sms_alert",
            NotificationRequest::IssueReport { .. } => "issue_report",
            NotificationRequest::IssueResolve { .. } => "issue_resolve",
        }
    }
}

/// Turns alert events into concrete requests for the configured channels.
#[derive(Debug, Clone)]
pub struct NotificationTemplates {
    pub sms_recipients: Vec<String>,
    pub issues_enabled: bool,
    pub issue_labels: Vec<String>,
    /// `{name}` is replaced with the target's display name.
    pub issue_title_template: String,
}

impl NotificationTemplates {
    pub fn from_config(messaging: &MessagingConfig, issues: &IssueConfig) -> Self {
        Self {
            sms_recipients: if messaging.enabled { messaging.to.clone() } else { Vec::new() },
            issues_enabled: issues.enabled,
            issue_labels: issues.labels.clone(),
            issue_title_template: issues.title_template.clone(),
        }
    }

    /// Issue title for a target; stable across runs so issues can be matched.
    pub fn issue_title(&self, target_name: &str) -> String {
        self.issue_title_template.replace("{name}", target_name)
    }

    pub fn render(&self, event: &AlertEvent, result: &CheckResult) -> Vec<NotificationRequest> {
        let name = result.target.display_name();
        let url = &result.target.url;
        let title = self.issue_title(name);
        let mut requests = Vec::new();

        match event {
            AlertEvent::Down { consecutive_failures, down_since } => {
                let reason = result
                    .error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "unknown failure".to_string());

                let sms = format!(
                    "🚨 {} is DOWN 🚨\n\nURL: {}\nReason: {}\nFailed checks: {}\n\nDown since: {}",
                    name,
                    url,
                    reason,
                    consecutive_failures,
                    format_timestamp(*down_since),
                );
                requests.extend(self.sms_recipients.iter().map(|to| NotificationRequest::SmsAlert {
                    to: to.clone(),
                    body: sms.clone(),
                }));

                if self.issues_enabled {
                    requests.push(NotificationRequest::IssueReport {
                        title,
                        body: format!(
                            "The monitor detected that {} went down at {}.\n\n\
                             Last check: {}\nConsecutive failed checks: {}\n\n\
                             This issue will be closed automatically when the site comes back up.",
                            url,
                            format_timestamp(*down_since),
                            reason,
                            consecutive_failures,
                        ),
                        labels: self.issue_labels.clone(),
                    });
                }
            }
            AlertEvent::Recovered { down_since, recovered_at } => {
                let downtime = down_since
                    .map(|since| format_downtime(recovered_at.signed_duration_since(since)))
                    .unwrap_or_else(|| "unknown".to_string());

                let sms = format!(
                    "✅ {} is back UP ✅\n\nURL: {}\nRecovered at: {}\nTotal downtime: {}",
                    name,
                    url,
                    format_timestamp(*recovered_at),
                    downtime,
                );
                requests.extend(self.sms_recipients.iter().map(|to| NotificationRequest::SmsAlert {
                    to: to.clone(),
                    body: sms.clone(),
                }));

                if self.issues_enabled {
                    requests.push(NotificationRequest::IssueResolve {
                        title,
                        comment: format!(
                            "Resolved: {} came back online at {} (downtime {}).",
                            url,
                            format_timestamp(*recovered_at),
                            downtime,
                        ),
                    });
                }
            }
        }

        requests
    }
}

/// `2024-05-01 12:00:00 UTC`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Compact human duration such as `1d 2h 5s`. Negative durations read as `0s`.
pub fn format_downtime(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (days, rem) = (total / 86_400, total % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, seconds) = (rem / 60, rem % 60);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckError, Target};
    use chrono::TimeZone;

    fn templates() -> NotificationTemplates {
        NotificationTemplates {
            sms_recipients: vec!["whatsapp:+15550001".into(), "+15550002".into()],
            issues_enabled: true,
            issue_labels: vec!["downtime".into()],
            issue_title_template: "Automated Alert: {name} is DOWN".into(),
        }
    }

    fn failing() -> CheckResult {
        CheckResult {
            target: Target::new("https://shop.example.com/", std::time::Duration::from_secs(5)).with_name("shop"),
            success: false,
            status_code: Some(502),
            latency: std::time::Duration::from_millis(80),
            error: Some(CheckError::StatusMismatch { expected: None, actual: 502 }),
            timestamp: Utc::now(),
            attempts: 1,
        }
    }

    #[test]
    fn test_format_downtime() {
        assert_eq!(format_downtime(Duration::seconds(0)), "0s");
        assert_eq!(format_downtime(Duration::seconds(59)), "59s");
        assert_eq!(format_downtime(Duration::seconds(3_600)), "1h 0s");
        assert_eq!(format_downtime(Duration::seconds(90_061)), "1d 1h 1m 1s");
        assert_eq!(format_downtime(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_down_event_renders_sms_per_recipient_and_one_issue() {
        let since = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = AlertEvent::Down { consecutive_failures: 3, down_since: since };
        let requests = templates().render(&event, &failing());

        assert_eq!(requests.len(), 3);
        assert!(matches!(&requests[0], NotificationRequest::SmsAlert { to, .. } if to == "whatsapp:+15550001"));
        match &requests[2] {
            NotificationRequest::IssueReport { title, body, labels } => {
                assert_eq!(title, "Automated Alert: shop is DOWN");
                assert!(body.contains("2024-05-01 12:00:00 UTC"));
                assert!(body.contains("expected 2xx, got 502"));
                assert_eq!(labels, &vec!["downtime".to_string()]);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_recovery_event_renders_resolve() {
        let since = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = AlertEvent::Recovered {
            down_since: Some(since),
            recovered_at: since + Duration::minutes(45),
        };
        let mut t = templates();
        t.sms_recipients.clear();
        let requests = t.render(&event, &failing());

        assert_eq!(
            requests,
            vec![NotificationRequest::IssueResolve {
                title: "Automated Alert: shop is DOWN".into(),
                comment: "Resolved: https://shop.example.com/ came back online at 2024-05-01 12:45:00 UTC (downtime 45m 0s).".into(),
            }]
        );
    }

    #[test]
    fn test_disabled_channels_render_nothing() {
        let t = NotificationTemplates::from_config(
            &MessagingConfig { enabled: false, to: vec!["+1".into()], ..MessagingConfig::default() },
            &IssueConfig { enabled: false, ..IssueConfig::default() },
        );
        let event = AlertEvent::Down { consecutive_failures: 1, down_since: Utc::now() };
        assert!(t.render(&event, &failing()).is_empty());
    }
}
