//! Alert state persistence.
//!
//! # Data Flow
//! ```text
//! run start: StateStore::load  → AlertStateMap (missing → empty)
//! run end:   StateStore::save  ← new AlertStateMap
//! ```
//!
//! # Design Decisions
//! - Read once and written once per run; nothing is cached between runs
//! - File writes replace the whole file atomically (last writer wins)
//! - Memory store for tests and path-less `watch` mode

pub mod file;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::alerting::AlertStateMap;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// External key-value store of alert state keyed by target URL.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<AlertStateMap, StoreError>;
    async fn save(&self, state: &AlertStateMap) -> Result<(), StoreError>;
}
