//! ProfileStateMachine — owns the in-memory app state and keeps it in step
//! with the key-value store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, WritePolicy};
use crate::error::{Error, Result, StateError, StoreError};
use crate::store::{KeyValueStore, WriteOp, keys};

use super::model::{Profile, ProfileField};
use super::prefs::{NotificationLabel, NotificationPrefs};
use super::state::{AppState, Phase};

const FLAG_TRUE: &str = "true";

/// Outcome of the avatar picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarPick {
    Picked(String),
    Canceled,
}

/// Onboarding / profile state backed by a [`KeyValueStore`].
///
/// Construct once per process and share by `Arc`. Every operation that
/// writes holds the state lock for its whole duration, so mutators never
/// interleave.
pub struct ProfileStateMachine {
    store: Arc<dyn KeyValueStore>,
    policy: WritePolicy,
    state: RwLock<AppState>,
}

impl ProfileStateMachine {
    pub fn new(store: Arc<dyn KeyValueStore>, policy: WritePolicy) -> Self {
        Self {
            store,
            policy,
            state: RwLock::new(AppState::Loading),
        }
    }

    /// Open the configured store and build a machine in `Loading`.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let store = config.open_store().await?;
        Ok(Self::new(store, config.write_policy))
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    pub async fn onboarding_complete(&self) -> bool {
        self.state.read().await.onboarding_complete()
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.state.read().await.profile().cloned()
    }

    /// Avatar URI shown in the header.
    pub async fn avatar_uri(&self) -> Option<String> {
        self.state
            .read()
            .await
            .profile()
            .and_then(|p| p.image.clone())
    }

    /// Derive state from the store.
    ///
    /// `Authenticated` only when the flag reads `"true"` and the stored
    /// profile parses. Read and parse failures are logged and resolve to
    /// `Onboarding`. The store itself is left as found.
    pub async fn hydrate(&self) -> AppState {
        let mut state = self.state.write().await;
        let next = self.read_persisted().await;
        info!(from = %state.phase(), to = %next.phase(), "Hydrated");
        *state = next.clone();
        next
    }

    /// First onboarding submit: persist flag and profile together.
    pub async fn complete_onboarding(&self, profile: Profile) -> Result<AppState> {
        let mut state = self.state.write().await;
        ensure_phase(&state, Phase::Onboarding, "complete_onboarding")?;
        let batch = profile_batch(&profile)?;
        self.commit(&mut state, &batch, AppState::Authenticated(profile), "complete_onboarding")
            .await
    }

    /// Profile-form submit: full overwrite of the stored profile.
    ///
    /// The flag is rewritten too, which is idempotent for a consistent store
    /// and repairs one that lost it.
    pub async fn update_profile(&self, profile: Profile) -> Result<AppState> {
        let mut state = self.state.write().await;
        ensure_phase(&state, Phase::Authenticated, "update_profile")?;
        let batch = profile_batch(&profile)?;
        self.commit(&mut state, &batch, AppState::Authenticated(profile), "update_profile")
            .await
    }

    /// Merge a picked avatar into the current profile. A canceled pick does
    /// nothing.
    pub async fn apply_avatar_pick(&self, pick: AvatarPick) -> Result<AppState> {
        let mut state = self.state.write().await;
        ensure_phase(&state, Phase::Authenticated, "apply_avatar_pick")?;
        let uri = match pick {
            AvatarPick::Picked(uri) => uri,
            AvatarPick::Canceled => {
                debug!("Avatar pick canceled");
                return Ok(state.clone());
            }
        };
        let updated = current_profile(&state).with_image(&uri);
        let batch = [WriteOp::set(keys::USER_DATA, encode_profile(&updated)?)];
        self.commit(&mut state, &batch, AppState::Authenticated(updated), "apply_avatar_pick")
            .await
    }

    /// Drop the avatar from the stored profile.
    pub async fn remove_avatar(&self) -> Result<AppState> {
        let mut state = self.state.write().await;
        ensure_phase(&state, Phase::Authenticated, "remove_avatar")?;
        let mut updated = current_profile(&state);
        if updated.image.is_none() {
            return Ok(state.clone());
        }
        updated.clear(ProfileField::Image);
        let batch = [WriteOp::set(keys::USER_DATA, encode_profile(&updated)?)];
        self.commit(&mut state, &batch, AppState::Authenticated(updated), "remove_avatar")
            .await
    }

    /// Stored notification preferences; missing or malformed data reads as
    /// all `false`.
    pub async fn preferences(&self) -> NotificationPrefs {
        let _guard = self.state.read().await;
        self.read_preferences().await
    }

    /// Set one preference and write the whole mapping back.
    pub async fn set_preference(
        &self,
        label: NotificationLabel,
        value: bool,
    ) -> Result<NotificationPrefs> {
        let _guard = self.state.write().await;
        let mut prefs = self.read_preferences().await;
        prefs.set(label, value);

        let raw = prefs
            .to_json()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        match self.store.set(keys::CHECKBOXES, &raw).await {
            Ok(()) => debug!(%label, value, "Preference saved"),
            Err(e) => self.on_write_failure("set_preference", e)?,
        }
        Ok(prefs)
    }

    /// `set_preference` by display label, e.g. `"Newsletter"`.
    pub async fn set_preference_by_label(
        &self,
        label: &str,
        value: bool,
    ) -> Result<NotificationPrefs> {
        let label: NotificationLabel = label.parse()?;
        self.set_preference(label, value).await
    }

    /// Remove flag, profile and preferences, then return to onboarding.
    ///
    /// Unconditional: runs from any state, so an inconsistent store left
    /// behind by an interrupted write can always be cleared.
    pub async fn logout(&self) -> Result<AppState> {
        let mut state = self.state.write().await;
        let batch: Vec<WriteOp> = keys::ALL.iter().map(|k| WriteOp::remove(*k)).collect();
        self.commit(&mut state, &batch, AppState::Onboarding, "logout")
            .await
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn read_persisted(&self) -> AppState {
        let flag = match self.store.get(keys::ONBOARDING_COMPLETE).await {
            Ok(flag) => flag,
            Err(e) => {
                warn!(error = %e, "Failed to read onboarding flag, falling back to onboarding");
                return AppState::Onboarding;
            }
        };
        let raw = match self.store.get(keys::USER_DATA).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read user data, falling back to onboarding");
                return AppState::Onboarding;
            }
        };

        let complete = flag.as_deref() == Some(FLAG_TRUE);
        match (complete, raw) {
            (true, Some(raw)) => match Profile::from_json(&raw) {
                Ok(profile) => AppState::Authenticated(profile),
                Err(e) => {
                    warn!(error = %e, "Stored user data is malformed, falling back to onboarding");
                    AppState::Onboarding
                }
            },
            (true, None) => {
                warn!("Onboarding flag set without user data, falling back to onboarding");
                AppState::Onboarding
            }
            (false, _) => AppState::Onboarding,
        }
    }

    async fn read_preferences(&self) -> NotificationPrefs {
        match self.store.get(keys::CHECKBOXES).await {
            Ok(Some(raw)) => NotificationPrefs::from_json(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored preferences are malformed, using defaults");
                NotificationPrefs::default()
            }),
            Ok(None) => NotificationPrefs::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read preferences, using defaults");
                NotificationPrefs::default()
            }
        }
    }

    /// Apply `batch`, then move to `next` according to the write policy.
    async fn commit(
        &self,
        state: &mut AppState,
        batch: &[WriteOp],
        next: AppState,
        operation: &'static str,
    ) -> Result<AppState> {
        if !state.phase().can_transition_to(next.phase()) {
            return Err(invalid(state, operation));
        }
        if let Err(e) = self.store.apply(batch).await {
            self.on_write_failure(operation, e)?;
        }
        info!(operation, from = %state.phase(), to = %next.phase(), "State transition");
        *state = next.clone();
        Ok(next)
    }

    fn on_write_failure(&self, operation: &'static str, e: StoreError) -> Result<()> {
        match self.policy {
            WritePolicy::Atomic => {
                warn!(operation, error = %e, "Store write failed, state unchanged");
                Err(e.into())
            }
            WritePolicy::BestEffort => {
                error!(operation, error = %e, "Store write failed, continuing with in-memory state");
                Ok(())
            }
        }
    }
}

fn ensure_phase(state: &AppState, expected: Phase, operation: &'static str) -> Result<()> {
    if state.phase() == expected {
        Ok(())
    } else {
        Err(invalid(state, operation))
    }
}

fn invalid(state: &AppState, operation: &'static str) -> Error {
    StateError::InvalidTransition {
        from: state.phase().to_string(),
        operation,
    }
    .into()
}

fn current_profile(state: &AppState) -> Profile {
    state.profile().cloned().unwrap_or_default()
}

fn encode_profile(profile: &Profile) -> Result<String> {
    profile
        .to_json()
        .map_err(|e| StoreError::Serialization(e.to_string()).into())
}

fn profile_batch(profile: &Profile) -> Result<[WriteOp; 2]> {
    Ok([
        WriteOp::set(keys::ONBOARDING_COMPLETE, FLAG_TRUE),
        WriteOp::set(keys::USER_DATA, encode_profile(profile)?),
    ])
}
