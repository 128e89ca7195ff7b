//! Check outcomes and the per-target error taxonomy.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::check::target::Target;

/// Why a request never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    Timeout,
    Dns,
    ConnectionRefused,
    Connect,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Dns => "dns",
            NetworkErrorKind::ConnectionRefused => "connection refused",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Errors that make a single check fail.
///
/// `Network` and `StatusMismatch` are normal monitored outcomes. `Config`
/// means the target itself is unusable and no request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckError {
    #[error("network error ({kind}): {message}")]
    Network { kind: NetworkErrorKind, message: String },

    #[error("status mismatch: expected {}, got {actual}", expected_label(.expected))]
    StatusMismatch { expected: Option<u16>, actual: u16 },

    #[error("invalid target: {reason}")]
    Config { reason: String },
}

fn expected_label(expected: &Option<u16>) -> String {
    match expected {
        Some(code) => code.to_string(),
        None => "2xx".to_string(),
    }
}

impl CheckError {
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        CheckError::Network { kind, message: message.into() }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        CheckError::Config { reason: reason.into() }
    }

    /// Stable tag used in logs, metrics and reports.
    pub fn tag(&self) -> &'static str {
        match self {
            CheckError::Network { .. } => "NetworkError",
            CheckError::StatusMismatch { .. } => "StatusMismatchError",
            CheckError::Config { .. } => "ConfigError",
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, CheckError::Config { .. })
    }
}

/// Outcome of probing one target once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub target: Target,
    pub success: bool,
    pub status_code: Option<u16>,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    pub error: Option<CheckError>,
    pub timestamp: DateTime<Utc>,
    /// Number of requests sent (0 for configuration errors).
    pub attempts: u32,
}

impl CheckResult {
    pub fn is_config_error(&self) -> bool {
        self.error.as_ref().is_some_and(CheckError::is_config)
    }

    /// Short label for the outcome: `up` or the error tag.
    pub fn outcome(&self) -> &'static str {
        match &self.error {
            None => "up",
            Some(e) => e.tag(),
        }
    }
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
