//! Persisted profile state — the app's core.
//!
//! `ProfileStateMachine` hydrates from the key-value store at startup,
//! gates onboarding vs. the main app, and keeps store and memory in step on
//! every write: onboarding submit, profile edits, avatar changes,
//! notification preferences, and logout.

pub mod manager;
pub mod model;
pub mod prefs;
pub mod state;

pub use manager::{AvatarPick, ProfileStateMachine};
pub use model::{Profile, ProfileField};
pub use prefs::{NotificationLabel, NotificationPrefs};
pub use state::{AppState, Phase};
