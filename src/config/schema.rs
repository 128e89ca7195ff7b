//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the uptime monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Monitored targets.
    pub targets: Vec<TargetConfig>,

    /// Probe defaults applied to every target.
    pub http: HttpConfig,

    /// Escalation thresholds and cooldown.
    pub alerting: AlertingConfig,

    /// SMS / WhatsApp channel settings.
    pub messaging: MessagingConfig,

    /// Issue tracker channel settings.
    pub issues: IssueConfig,

    /// Alert state persistence.
    pub state: StateConfig,

    /// Interval used by `watch` mode.
    pub schedule: ScheduleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP method used for probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeMethod {
    #[default]
    Get,
    Head,
}

/// A single monitored target.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TargetConfig {
    /// URL to probe. Also the identity of the target.
    pub url: String,

    /// Display name used in notifications (defaults to the URL).
    #[serde(default)]
    pub name: Option<String>,

    /// Exact status code required. Any 2xx is accepted when unset.
    #[serde(default)]
    pub expected_status: Option<u16>,

    /// Per-target timeout override in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Per-target method override.
    #[serde(default)]
    pub method: Option<ProbeMethod>,
}

impl TargetConfig {
    /// Shorthand for a target with every option defaulted.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            expected_status: None,
            timeout_secs: None,
            method: None,
        }
    }
}

/// Probe defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Default probe method.
    pub method: ProbeMethod,

    /// User-Agent header sent with probes.
    pub user_agent: String,

    /// Extra attempts before a failure is recorded.
    pub retries: u32,

    /// Base delay for retry backoff in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Maximum delay for retry backoff in milliseconds.
    pub retry_max_delay_ms: u64,

    /// Maximum number of probes in flight.
    pub concurrency: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            method: ProbeMethod::Get,
            user_agent: concat!("uptime-monitor/", env!("CARGO_PKG_VERSION")).to_string(),
            retries: 0,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 5000,
            concurrency: 8,
        }
    }
}

/// Escalation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Consecutive failures before the first notification.
    pub failure_threshold: u32,

    /// Re-notify every N failures past the threshold (0 = never).
    pub repeat_every: u32,

    /// Minimum seconds between notifications for the same target.
    pub cooldown_secs: u64,

    /// Send recovery notices when an alerted target comes back.
    pub notify_recovery: bool,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 1,
            repeat_every: 0,
            cooldown_secs: 3600,
            notify_recovery: true,
        }
    }
}

/// Messaging provider configuration (numbers only; credentials come from the environment).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Enable the SMS channel.
    pub enabled: bool,

    /// Sender number, e.g. `whatsapp:+14155238886`.
    pub from: String,

    /// Recipient numbers.
    pub to: Vec<String>,

    /// Provider API base URL.
    pub api_base: String,

    /// Deadline for one provider request in seconds.
    pub timeout_secs: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from: String::new(),
            to: Vec::new(),
            api_base: "https://api.twilio.com".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Issue tracker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IssueConfig {
    /// Enable the issue channel.
    pub enabled: bool,

    /// Labels attached to opened issues.
    pub labels: Vec<String>,

    /// Title template; `{name}` is replaced with the target name.
    pub title_template: String,

    /// Provider API base URL.
    pub api_base: String,

    /// Deadline for one provider request in seconds.
    pub timeout_secs: u64,
}

impl Default for IssueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            labels: vec!["downtime".to_string()],
            title_template: "Automated Alert: {name} is DOWN".to_string(),
            api_base: "https://api.github.com".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Alert state persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StateConfig {
    /// Path of the JSON state file. Memory-only when unset.
    pub path: Option<String>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: Some("uptime-state.json".to_string()),
        }
    }
}

/// Schedule for `watch` mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between check passes.
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 900 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json: bool,

    /// Enable metrics endpoint (watch mode only).
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
