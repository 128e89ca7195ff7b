//! One check pass over all targets.
//!
//! # Data Flow
//! ```text
//! targets + prior AlertStateMap + run time
//!     → bounded fan-out: check_target per target (at most `concurrency` in flight)
//!     → barrier: all results collected, restored to input order
//!     → single-task merge: EscalationPolicy per result → new state + events
//!     → NotificationTemplates → NotificationRequests
//!     → RunReport
//! ```
//!
//! # Design Decisions
//! - Checks share nothing while in flight; only the merge touches state
//! - State entries of targets not in this pass are carried over unchanged
//! - The run never fails: per-target problems are results, not errors

pub mod report;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::Instrument;
use uuid::Uuid;

use crate::alerting::{AlertStateMap, EscalationPolicy, NotificationTemplates};
use crate::check::{check_target, CheckResult, HttpProbe, Probe, Target};
use crate::config::MonitorConfig;
use crate::observability::metrics;
use crate::resilience::retries::RetryPolicy;

pub use report::{RunReport, RunSummary};

/// Runs check passes. Holds no state between runs.
pub struct UptimeCheckRunner<P: Probe + ?Sized = HttpProbe> {
    probe: Arc<P>,
    policy: EscalationPolicy,
    templates: NotificationTemplates,
    retry: RetryPolicy,
    concurrency: usize,
}

impl UptimeCheckRunner<HttpProbe> {
    /// Build a runner with a real HTTP probe from configuration.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, reqwest::Error> {
        let probe = HttpProbe::new(&config.http)?;
        Ok(Self::new(Arc::new(probe), config))
    }
}

impl<P: Probe + ?Sized> UptimeCheckRunner<P> {
    pub fn new(probe: Arc<P>, config: &MonitorConfig) -> Self {
        Self {
            probe,
            policy: EscalationPolicy::from_config(&config.alerting),
            templates: NotificationTemplates::from_config(&config.messaging, &config.issues),
            retry: RetryPolicy::new(
                config.http.retries.saturating_add(1),
                config.http.retry_base_delay_ms,
                config.http.retry_max_delay_ms,
            ),
            concurrency: config.http.concurrency.max(1),
        }
    }

    /// Probe every target and fold the outcomes into `prior`.
    ///
    /// `now` is the logical run time used for all state timestamps, so two
    /// runs with the same prior state, outcomes and `now` agree exactly.
    pub async fn run(&self, targets: &[Target], prior: &AlertStateMap, now: DateTime<Utc>) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("check_run", %run_id, targets = targets.len());

        async move {
            let results = self.check_all(targets).await;
            let report = self.merge(run_id, results, prior, now);

            let summary = report.summary();
            tracing::info!(
                up = summary.up,
                down = summary.down,
                misconfigured = summary.misconfigured,
                notifications = report.notifications.len(),
                suppressed = report.suppressed,
                "Check pass complete"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn check_all(&self, targets: &[Target]) -> Vec<CheckResult> {
        let probe = self.probe.as_ref();
        let retry = self.retry;

        let mut indexed: Vec<(usize, CheckResult)> = stream::iter(targets.iter().enumerate())
            .map(move |(i, target)| async move { (i, check_target(probe, target, retry).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    fn merge(&self, run_id: Uuid, results: Vec<CheckResult>, prior: &AlertStateMap, now: DateTime<Utc>) -> RunReport {
        let mut new_state = prior.clone();
        let mut notifications = Vec::new();
        let mut suppressed = 0;

        for result in &results {
            log_result(result);
            metrics::record_check(result);

            let url = &result.target.url;
            let transition = self.policy.transition(prior.get(url), result, now);

            if let Some(next) = transition.next {
                new_state.insert(url.clone(), next);
            }
            if transition.suppressed {
                suppressed += 1;
                tracing::info!(target_url = %url, "Notification due but within cooldown");
            }
            if let Some(event) = &transition.event {
                tracing::info!(target_url = %url, event = ?event, "Alert raised");
                notifications.extend(self.templates.render(event, result));
            }
        }

        RunReport {
            run_id,
            started_at: now,
            results,
            new_state,
            notifications,
            suppressed,
        }
    }
}

fn log_result(result: &CheckResult) {
    let latency_ms = result.latency.as_millis() as u64;
    match &result.error {
        None => tracing::info!(
            target_url = %result.target.url,
            status = ?result.status_code,
            latency_ms,
            "Target is up"
        ),
        Some(e) if e.is_config() => tracing::error!(
            target_url = %result.target.url,
            error = %e,
            "Target is misconfigured"
        ),
        Some(e) => tracing::warn!(
            target_url = %result.target.url,
            status = ?result.status_code,
            latency_ms,
            attempts = result.attempts,
            kind = e.tag(),
            error = %e,
            "Target is down"
        ),
    }
}
