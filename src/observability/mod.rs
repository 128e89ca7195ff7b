//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per check run)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log output (stdout: pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, watch mode)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (target_url, status, latency_ms)
//! - Run ID on the run span ties a pass's events together
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
