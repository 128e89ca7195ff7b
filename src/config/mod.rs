//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable for one run)
//!
//! Environment (read once by the CLI)
//!     → credentials.rs (Credentials)
//!     → adapter construction only
//!
//! watch mode:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → next pass uses the new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Secrets never live in the config file

pub mod credentials;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use credentials::Credentials;
pub use loader::{load_config, ConfigError};
pub use schema::{
    AlertingConfig, HttpConfig, IssueConfig, MessagingConfig, MonitorConfig,
    ObservabilityConfig, ProbeMethod, ScheduleConfig, StateConfig, TargetConfig,
};
