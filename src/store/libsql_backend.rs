//! libSQL backend — async `KeyValueStore` implementation.
//!
//! Supports local file and in-memory databases. All keys live in a single
//! `kv_store` table; batches run inside a SQL transaction.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{KeyValueStore, WriteOp};

const UPSERT_SQL: &str = "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3";
const DELETE_SQL: &str = "DELETE FROM kv_store WHERE key = ?1";

/// libSQL key-value store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    /// Held so the database outlives `conn`; never queried directly.
    _db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create store directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::connect(db).await?;
        info!(path = %path.display(), "Store opened");
        Ok(store)
    }

    /// Create an in-memory database.
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        Self::connect(db).await
    }

    async fn connect(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            _db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl KeyValueStore for LibSqlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT value FROM kv_store WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("get: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(UPSERT_SQL, params![key, value, now])
            .await
            .map_err(|e| StoreError::Query(format!("set: {e}")))?;
        debug!(key, "kv set");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let count = self
            .conn()
            .execute(DELETE_SQL, params![key])
            .await
            .map_err(|e| StoreError::Query(format!("remove: {e}")))?;
        debug!(key, existed = count > 0, "kv remove");
        Ok(count > 0)
    }

    async fn apply(&self, batch: &[WriteOp]) -> Result<(), StoreError> {
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| StoreError::Query(format!("begin: {e}")))?;
        let now = Utc::now().to_rfc3339();

        for op in batch {
            let result = match op {
                WriteOp::Set { key, value } => tx
                    .execute(UPSERT_SQL, params![key.as_str(), value.as_str(), now.as_str()])
                    .await
                    .map(|_| ()),
                WriteOp::Remove { key } => tx
                    .execute(DELETE_SQL, params![key.as_str()])
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = result {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(StoreError::Query(format!("apply {}: {e}", op.key())));
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Query(format!("commit: {e}")))?;
        debug!(ops = batch.len(), "kv batch committed");
        Ok(())
    }
}
