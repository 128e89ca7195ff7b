//! Lifecycle management for `watch` mode.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → watch loop finishes the current pass and exits
//! ```
//!
//! # Design Decisions
//! - A pass in progress is never interrupted; state is always saved
//! - One-shot `check` mode needs none of this

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
