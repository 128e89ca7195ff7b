//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Detect duplicate targets
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Malformed target URLs are NOT rejected here: they are reported per run
//!   as configuration failures so the remaining targets keep being checked
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.timeout_secs == 0 {
        errors.push(ValidationError::new("http.timeout_secs", "must be greater than 0"));
    }
    if config.http.concurrency == 0 {
        errors.push(ValidationError::new("http.concurrency", "must be greater than 0"));
    }
    if config.http.retry_base_delay_ms > config.http.retry_max_delay_ms {
        errors.push(ValidationError::new(
            "http.retry_base_delay_ms",
            "must not exceed http.retry_max_delay_ms",
        ));
    }
    if config.alerting.failure_threshold == 0 {
        errors.push(ValidationError::new("alerting.failure_threshold", "must be at least 1"));
    }
    if config.schedule.interval_secs == 0 {
        errors.push(ValidationError::new("schedule.interval_secs", "must be greater than 0"));
    }

    let mut seen = HashSet::new();
    let mut titles = HashSet::new();
    for (i, target) in config.targets.iter().enumerate() {
        if !seen.insert(target.url.as_str()) {
            errors.push(ValidationError::new(
                format!("targets[{}].url", i),
                format!("duplicate target '{}'", target.url),
            ));
        } else if config.issues.enabled {
            // Issues are matched by title; two targets must never share one.
            let name = target.name.as_deref().unwrap_or(&target.url);
            let title = config.issues.title_template.replace("{name}", name);
            if !titles.insert(title.clone()) {
                errors.push(ValidationError::new(
                    format!("targets[{}].name", i),
                    format!("issue title '{}' is already used by another target", title),
                ));
            }
        }
        if target.timeout_secs == Some(0) {
            errors.push(ValidationError::new(
                format!("targets[{}].timeout_secs", i),
                "must be greater than 0",
            ));
        }
        if let Some(code) = target.expected_status {
            if !(100..=599).contains(&code) {
                errors.push(ValidationError::new(
                    format!("targets[{}].expected_status", i),
                    format!("{} is not an HTTP status code", code),
                ));
            }
        }
    }

    if config.messaging.enabled && !config.messaging.to.is_empty() && config.messaging.from.is_empty() {
        errors.push(ValidationError::new(
            "messaging.from",
            "sender is required when recipients are configured",
        ));
    }
    if config.issues.enabled && config.issues.title_template.trim().is_empty() {
        errors.push(ValidationError::new("issues.title_template", "must not be empty"));
    }
    if config.messaging.timeout_secs == 0 {
        errors.push(ValidationError::new("messaging.timeout_secs", "must be greater than 0"));
    }
    if config.issues.timeout_secs == 0 {
        errors.push(ValidationError::new("issues.timeout_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
