//! Persistence layer — the on-device key-value store.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, WriteOp, apply_with_rollback};

/// Keys the app persists under.
pub mod keys {
    /// Literal `"true"` once onboarding has completed.
    pub const ONBOARDING_COMPLETE: &str = "isOnboardingComplete";
    /// JSON-encoded profile record.
    pub const USER_DATA: &str = "userData";
    /// JSON-encoded notification preferences.
    pub const CHECKBOXES: &str = "checkboxes";

    /// Every key cleared on logout.
    pub const ALL: [&str; 3] = [ONBOARDING_COMPLETE, USER_DATA, CHECKBOXES];
}
