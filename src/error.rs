//! Process-level setup errors.
//!
//! Only these abort a run. Down targets and failed notifications are
//! reported outcomes, never errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error(transparent)]
    State(#[from] StoreError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("config watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("metrics exporter error: {0}")]
    Metrics(String),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 1,
            AppError::MissingCredential(_) => 2,
            AppError::State(_) => 3,
            AppError::HttpClient(_) | AppError::Watch(_) | AppError::Metrics(_) => 4,
        }
    }
}
