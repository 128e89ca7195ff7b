//! Monitored targets.

use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::check::result::CheckError;
use crate::config::{HttpConfig, ProbeMethod, TargetConfig};

/// A monitored URL with its expected response criteria.
///
/// Identity is the raw `url` string exactly as configured; it is also the
/// key of the target's alert state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub url: String,
    pub name: Option<String>,
    /// Exact status required; any 2xx when `None`.
    pub expected_status: Option<u16>,
    pub timeout: Duration,
    pub method: ProbeMethod,
}

impl Target {
    /// A GET target accepting any 2xx.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            name: None,
            expected_status: None,
            timeout,
            method: ProbeMethod::Get,
        }
    }

    /// Resolve a configured target against the probe defaults.
    pub fn from_config(config: &TargetConfig, http: &HttpConfig) -> Self {
        Self {
            url: config.url.clone(),
            name: config.name.clone(),
            expected_status: config.expected_status,
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(http.timeout_secs)),
            method: config.method.unwrap_or(http.method),
        }
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name shown in notifications.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }

    /// Parse the URL, rejecting anything that cannot be probed over HTTP.
    pub fn parse_url(&self) -> Result<Url, CheckError> {
        let url = Url::parse(self.url.trim())
            .map_err(|e| CheckError::config(format!("malformed URL '{}': {}", self.url, e)))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(CheckError::config(format!(
                    "unsupported scheme '{}' in '{}'",
                    other, self.url
                )))
            }
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(CheckError::config(format!("missing host in '{}'", self.url)));
        }
        Ok(url)
    }

    /// Whether a response status counts as up.
    pub fn accepts(&self, status: u16) -> bool {
        match self.expected_status {
            Some(expected) => status == expected,
            None => (200..300).contains(&status),
        }
    }
}

/// Resolve every configured target.
pub fn targets_from_config(targets: &[TargetConfig], http: &HttpConfig) -> Vec<Target> {
    targets.iter().map(|t| Target::from_config(t, http)).collect()
}
