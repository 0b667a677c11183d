//! App state machine — which top-level flow the user is in.

use crate::navigation::{ScreenTree, gate};

use super::model::Profile;

/// Discriminant of [`AppState`], used for transition checks and logging.
///
/// `Loading → {Onboarding, Authenticated}`, then back and forth between the
/// two indefinitely. Logout may land in `Onboarding` from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Onboarding,
    Authenticated,
}

impl Phase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Loading, Onboarding)
                | (Loading, Authenticated)
                | (Onboarding, Authenticated)
                | (Onboarding, Onboarding)
                | (Authenticated, Authenticated)
                | (Authenticated, Onboarding)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Onboarding => "onboarding",
            Self::Authenticated => "authenticated",
        };
        write!(f, "{s}")
    }
}

/// In-memory view of the persisted profile state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppState {
    /// Store not read yet; the UI shows a loading indicator.
    #[default]
    Loading,
    Onboarding,
    Authenticated(Profile),
}

impl AppState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Loading => Phase::Loading,
            Self::Onboarding => Phase::Onboarding,
            Self::Authenticated(_) => Phase::Authenticated,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn onboarding_complete(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }

    /// Screen tree to render, `None` while loading.
    pub fn screen(&self) -> Option<ScreenTree> {
        if self.is_loading() {
            None
        } else {
            Some(gate(self.onboarding_complete()))
        }
    }
}
