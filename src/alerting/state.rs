//! Per-target alert state carried between runs.
//!
//! # States
//! ```text
//! Up (0 failures) → Down: first failed check, down_since = run time
//! Down → Down: failures += 1
//! Down → Up: any success resets failures to 0
//! ```
//!
//! # Design Decisions
//! - Keyed by the target URL exactly as configured
//! - Ordered map so serialized state and comparisons are deterministic
//! - `last_notified_at` is cleared when an alerted streak recovers; a
//!   below-threshold blip keeps it, so the cooldown still applies

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Escalation bookkeeping for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub target_url: String,
    pub consecutive_failures: u32,
    #[serde(default)]
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Run time of the first failure of the current streak.
    #[serde(default)]
    pub down_since: Option<DateTime<Utc>>,
}

impl AlertState {
    /// State for a target that has never failed.
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            consecutive_failures: 0,
            last_notified_at: None,
            down_since: None,
        }
    }

    pub fn is_down(&self) -> bool {
        self.consecutive_failures > 0
    }

    /// Whether a notification was already sent during the current failure streak.
    pub fn notified_this_streak(&self) -> bool {
        match (self.last_notified_at, self.down_since) {
            (Some(notified), Some(since)) => notified >= since,
            _ => false,
        }
    }
}

/// Alert state for every known target, keyed by URL.
pub type AlertStateMap = BTreeMap<String, AlertState>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_streak_notification_tracking() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 15, 0).unwrap();

        let mut state = AlertState::new("https://example.com");
        assert!(!state.notified_this_streak());

        state.consecutive_failures = 1;
        state.down_since = Some(t1);
        state.last_notified_at = Some(t0);
        assert!(!state.notified_this_streak(), "notification predates the streak");

        state.last_notified_at = Some(t1);
        assert!(state.notified_this_streak());
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let state: AlertState =
            serde_json::from_str(r#"{"target_url":"https://example.com","consecutive_failures":2}"#).unwrap();
        assert_eq!(state.consecutive_failures, 2);
        assert!(state.last_notified_at.is_none());
        assert!(state.down_since.is_none());
    }
}
