//! Escalation policy.
//!
//! Turns (prior state, check outcome, run time) into the next state and an
//! optional alert event. Pure: the same inputs always give the same output,
//! which keeps overlapping runs idempotent.

use chrono::{DateTime, Duration, Utc};

use crate::alerting::state::AlertState;
use crate::check::CheckResult;
use crate::config::AlertingConfig;

/// Something worth telling a human about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    /// The target is failing and a notification is due.
    Down {
        consecutive_failures: u32,
        down_since: DateTime<Utc>,
    },
    /// A previously alerted target is answering again.
    Recovered {
        down_since: Option<DateTime<Utc>>,
        recovered_at: DateTime<Utc>,
    },
}

/// Result of applying one check outcome to a target's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// `None` when the state entry must be left untouched.
    pub next: Option<AlertState>,
    pub event: Option<AlertEvent>,
    /// A notification was due but held back by the cooldown.
    pub suppressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Consecutive failures before the first notification (≥ 1).
    pub threshold: u32,
    /// Re-notify every N failures past the threshold; 0 disables repeats.
    pub repeat_every: u32,
    pub cooldown: Duration,
    pub notify_recovery: bool,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::from_config(&AlertingConfig::default())
    }
}

impl EscalationPolicy {
    pub fn from_config(config: &AlertingConfig) -> Self {
        Self {
            threshold: config.failure_threshold.max(1),
            repeat_every: config.repeat_every,
            cooldown: Duration::seconds(config.cooldown_secs.min(i64::MAX as u64 / 1000) as i64),
            notify_recovery: config.notify_recovery,
        }
    }

    fn is_repeat_tick(&self, failures: u32) -> bool {
        self.repeat_every > 0
            && failures > self.threshold
            && (failures - self.threshold) % self.repeat_every == 0
    }

    fn in_cooldown(&self, last_notified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        last_notified_at.is_some_and(|at| now.signed_duration_since(at) < self.cooldown)
    }

    /// Apply one check result to the prior state of its target.
    pub fn transition(&self, prior: Option<&AlertState>, result: &CheckResult, now: DateTime<Utc>) -> Transition {
        if result.is_config_error() {
            return Transition {
                next: None,
                event: None,
                suppressed: false,
            };
        }

        let prior = prior
            .cloned()
            .unwrap_or_else(|| AlertState::new(result.target.url.clone()));

        if result.success {
            self.on_success(prior, now)
        } else {
            self.on_failure(prior, now)
        }
    }

    fn on_success(&self, prior: AlertState, now: DateTime<Utc>) -> Transition {
        let was_alerted = prior.consecutive_failures >= self.threshold && prior.notified_this_streak();

        let event = (was_alerted && self.notify_recovery).then(|| AlertEvent::Recovered {
            down_since: prior.down_since,
            recovered_at: now,
        });

        // A closed incident releases the cooldown so the next outage is announced.
        let next = AlertState {
            consecutive_failures: 0,
            down_since: None,
            last_notified_at: if was_alerted { None } else { prior.last_notified_at },
            ..prior
        };

        Transition {
            next: Some(next),
            event,
            suppressed: false,
        }
    }

    fn on_failure(&self, prior: AlertState, now: DateTime<Utc>) -> Transition {
        let failures = prior.consecutive_failures.saturating_add(1);
        let down_since = match prior.down_since {
            Some(since) if prior.is_down() => since,
            _ => now,
        };

        let mut next = AlertState {
            consecutive_failures: failures,
            down_since: Some(down_since),
            ..prior
        };

        let due = failures >= self.threshold
            && (!next.notified_this_streak() || self.is_repeat_tick(failures));

        if !due {
            return Transition {
                next: Some(next),
                event: None,
                suppressed: false,
            };
        }

        if self.in_cooldown(next.last_notified_at, now) {
            return Transition {
                next: Some(next),
                event: None,
                suppressed: true,
            };
        }

        next.last_notified_at = Some(now);
        Transition {
            next: Some(next),
            event: Some(AlertEvent::Down {
                consecutive_failures: failures,
                down_since,
            }),
            suppressed: false,
        }
    }
}
