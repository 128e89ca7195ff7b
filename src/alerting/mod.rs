//! Alerting subsystem.
//!
//! # Data Flow
//! ```text
//! CheckResult + prior AlertState (state.rs)
//!     → policy.rs (threshold / repeat / cooldown decision)
//!     → next AlertState + optional AlertEvent
//!     → notification.rs (render SMS + issue requests)
//! ```
//!
//! # Design Decisions
//! - Decisions are pure functions of their inputs and the run time
//! - Requests are data; delivery happens in `notify`
//! - One issue per target, identified by its title

pub mod notification;
pub mod policy;
pub mod state;

pub use notification::{format_downtime, format_timestamp, NotificationRequest, NotificationTemplates};
pub use policy::{AlertEvent, EscalationPolicy, Transition};
pub use state::{AlertState, AlertStateMap};
