//! Scheduled website uptime monitor.
//!
//! One invocation performs one check pass: probe every target, fold the
//! outcomes into persisted alert state, and deliver the SMS / issue
//! notifications the escalation policy calls for.

pub mod alerting;
pub mod app;
pub mod check;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod resilience;
pub mod runner;
pub mod store;

pub use app::{run_once, watch, PassOutcome};
pub use config::MonitorConfig;
pub use error::AppError;
pub use runner::{RunReport, UptimeCheckRunner};
