//! Configuration types.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ConfigError, StoreError};
use crate::store::{KeyValueStore, LibSqlStore, MemoryStore};

/// Where the key-value store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// libSQL database file.
    File(PathBuf),
    /// Process-local map; nothing survives a restart.
    Memory,
}

/// How store write failures interact with in-memory state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Writes are applied all-or-nothing and in-memory state only advances
    /// once the store acknowledges. Failures are returned to the caller.
    #[default]
    Atomic,
    /// In-memory state advances even if the store write fails; the failure
    /// is logged and swallowed.
    BestEffort,
}

impl std::str::FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(Self::Atomic),
            "best_effort" | "best-effort" => Ok(Self::BestEffort),
            other => Err(ConfigError::InvalidValue {
                key: ENV_WRITE_POLICY.to_string(),
                message: format!("expected 'atomic' or 'best_effort', got '{other}'"),
            }),
        }
    }
}

const ENV_DB_PATH: &str = "PROFILE_GATE_DB_PATH";
const ENV_WRITE_POLICY: &str = "PROFILE_GATE_WRITE_POLICY";
const ENV_LOG: &str = "PROFILE_GATE_LOG";

/// App configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store backend and location.
    pub store: StoreLocation,
    /// Write failure policy for the state machine.
    pub write_policy: WritePolicy,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::File(PathBuf::from("./data/profile.db")),
            write_policy: WritePolicy::Atomic,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `PROFILE_GATE_*` environment variables, defaulting the rest.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.store = match path.trim() {
                "" => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_DB_PATH.to_string(),
                        message: "path is empty".to_string(),
                    });
                }
                ":memory:" => StoreLocation::Memory,
                p => StoreLocation::File(PathBuf::from(p)),
            };
        }
        if let Some(policy) = lookup(ENV_WRITE_POLICY) {
            config.write_policy = policy.parse()?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }

        Ok(config)
    }

    /// Open the configured store backend.
    pub async fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        let store: Arc<dyn KeyValueStore> = match &self.store {
            StoreLocation::File(path) => Arc::new(LibSqlStore::new_local(path).await?),
            StoreLocation::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}
