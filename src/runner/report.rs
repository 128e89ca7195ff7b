//! Output of a check pass.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::alerting::{AlertStateMap, NotificationRequest};
use crate::check::CheckResult;

/// Everything one pass produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// One entry per input target, in input order.
    pub results: Vec<CheckResult>,
    pub new_state: AlertStateMap,
    pub notifications: Vec<NotificationRequest>,
    /// Notifications held back by the cooldown.
    pub suppressed: usize,
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub up: usize,
    pub down: usize,
    pub misconfigured: usize,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        self.results.iter().fold(RunSummary::default(), |mut s, r| {
            if r.success {
                s.up += 1;
            } else if r.is_config_error() {
                s.misconfigured += 1;
            } else {
                s.down += 1;
            }
            s
        })
    }

    pub fn down_targets(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
