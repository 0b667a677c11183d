//! `KeyValueStore` trait — single async interface for all persistence.
//!
//! The app keeps everything it needs under a handful of string keys. Values
//! are opaque strings; callers own the encoding (JSON for records, a literal
//! `"true"` for flags).

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::warn;

use crate::error::StoreError;

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl WriteOp {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    /// The key this op touches.
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// Async persistent string-keyed store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Apply a batch of writes all-or-nothing.
    ///
    /// The default implementation snapshots every touched key, applies the
    /// ops one by one and restores the snapshot if any op fails. Backends
    /// with native transactions should override it.
    async fn apply(&self, batch: &[WriteOp]) -> Result<(), StoreError> {
        apply_with_rollback(self, batch).await
    }
}

/// Sequentially apply `batch`, restoring prior values on the first failure.
///
/// Restoration is itself best-effort: a failing restore is logged and the
/// first write error is still returned.
pub async fn apply_with_rollback<S>(store: &S, batch: &[WriteOp]) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let mut snapshot: BTreeMap<&str, Option<String>> = BTreeMap::new();
    for op in batch {
        if !snapshot.contains_key(op.key()) {
            let prior = store.get(op.key()).await?;
            snapshot.insert(op.key(), prior);
        }
    }

    for (applied, op) in batch.iter().enumerate() {
        let result = match op {
            WriteOp::Set { key, value } => store.set(key, value).await,
            WriteOp::Remove { key } => store.remove(key).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!(
                key = op.key(),
                applied,
                "Batch write failed, restoring previous values"
            );
            for (key, prior) in &snapshot {
                let restored = match prior {
                    Some(value) => store.set(key, value).await,
                    None => store.remove(key).await.map(|_| ()),
                };
                if let Err(restore_err) = restored {
                    warn!(key = *key, error = %restore_err, "Failed to restore key after batch failure");
                }
            }
            return Err(e);
        }
    }
    Ok(())
}
