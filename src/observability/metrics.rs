//! Metrics collection and exposition.
//!
//! # Metrics
//! - `uptime_checks_total` (counter): checks by target and outcome
//! - `uptime_check_duration_seconds` (histogram): probe latency by target
//! - `uptime_target_up` (gauge): 1=up, 0=down per target
//! - `uptime_notifications_total` (counter): notifications by kind and outcome

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::check::CheckResult;

/// Start the Prometheus scrape endpoint and install the global recorder.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the outcome of one check.
pub fn record_check(result: &CheckResult) {
    let target = result.target.url.clone();
    counter!("uptime_checks_total", "target" => target.clone(), "outcome" => result.outcome()).increment(1);
    if result.is_config_error() {
        return;
    }
    histogram!("uptime_check_duration_seconds", "target" => target.clone()).record(result.latency.as_secs_f64());
    gauge!("uptime_target_up", "target" => target).set(if result.success { 1.0 } else { 0.0 });
}

/// Record a notification delivery attempt.
pub fn record_notification(kind: &'static str, outcome: &'static str) {
    counter!("uptime_notifications_total", "kind" => kind, "outcome" => outcome).increment(1);
}
