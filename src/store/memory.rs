//! In-memory `KeyValueStore` with fault injection.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::store::traits::KeyValueStore;

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    failing_writes: HashSet<String>,
    failing_reads: HashSet<String>,
}

/// Process-local store. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` on `key` fail.
    pub async fn fail_writes_to(&self, key: &str) {
        self.inner.write().await.failing_writes.insert(key.to_string());
    }

    /// Make every subsequent `get` on `key` fail.
    pub async fn fail_reads_of(&self, key: &str) {
        self.inner.write().await.failing_reads.insert(key.to_string());
    }

    /// Remove all injected faults.
    pub async fn clear_faults(&self) {
        let mut inner = self.inner.write().await;
        inner.failing_writes.clear();
        inner.failing_reads.clear();
    }

    /// Copy of every stored entry.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.read().await.entries.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        if inner.failing_reads.contains(key) {
            return Err(StoreError::Injected(key.to_string()));
        }
        Ok(inner.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.failing_writes.contains(key) {
            return Err(StoreError::Injected(key.to_string()));
        }
        debug!(key, "memory set");
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.failing_writes.contains(key) {
            return Err(StoreError::Injected(key.to_string()));
        }
        debug!(key, "memory remove");
        Ok(inner.entries.remove(key).is_some())
    }
}
