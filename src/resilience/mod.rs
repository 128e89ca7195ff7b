//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe or provider call:
//!     → timeouts.rs (enforce a deadline on the call)
//!     → On failure: retries.rs (check if retryable, retry with backoff)
//!     → backoff.rs (jittered exponential delay between attempts)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries are bounded by a fixed attempt count
//! - Only transient errors are retried

pub mod backoff;
pub mod retries;
pub mod timeouts;
