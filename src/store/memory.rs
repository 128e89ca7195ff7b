//! In-memory state store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::alerting::{AlertState, AlertStateMap};
use crate::store::{StateStore, StoreError};

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, AlertState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with an existing map.
    pub fn with_state(state: AlertStateMap) -> Self {
        let store = Self::new();
        for (url, entry) in state {
            store.inner.insert(url, entry);
        }
        store
    }

    pub fn get(&self, url: &str) -> Option<AlertState> {
        self.inner.get(url).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<AlertStateMap, StoreError> {
        Ok(self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect())
    }

    async fn save(&self, state: &AlertStateMap) -> Result<(), StoreError> {
        self.inner.retain(|url, _| state.contains_key(url));
        for (url, entry) in state {
            self.inner.insert(url.clone(), entry.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_replaces_contents() {
        let store = MemoryStore::with_state(AlertStateMap::from([(
            "https://old.example".to_string(),
            AlertState::new("https://old.example"),
        )]));

        let next = AlertStateMap::from([(
            "https://new.example".to_string(),
            AlertState::new("https://new.example"),
        )]);
        store.save(&next).await.unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get("https://old.example").is_none());
        assert_eq!(store.load().await.unwrap(), next);
    }
}
