//! End-to-end flows through form capture, the state machine and both store
//! backends.

use std::sync::Arc;

use profile_gate::config::WritePolicy;
use profile_gate::error::Error;
use profile_gate::form::{Draft, FormSpec};
use profile_gate::navigation::{Route, ScreenTree};
use profile_gate::profile::{
    AppState, AvatarPick, NotificationLabel, Profile, ProfileField, ProfileStateMachine,
};
use profile_gate::store::{KeyValueStore, LibSqlStore, MemoryStore, keys};

async fn stores() -> Vec<(&'static str, Arc<dyn KeyValueStore>)> {
    let memory: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let libsql: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_memory().await.unwrap());
    vec![("memory", memory), ("libsql", libsql)]
}

fn onboarding_draft(first_name: &str, email: &str) -> Draft {
    let mut draft = Draft::new();
    draft.set(ProfileField::FirstName, first_name);
    draft.set(ProfileField::Email, email);
    draft
}

async fn read_all(store: &dyn KeyValueStore) -> [Option<String>; 3] {
    [
        store.get(keys::ONBOARDING_COMPLETE).await.unwrap(),
        store.get(keys::USER_DATA).await.unwrap(),
        store.get(keys::CHECKBOXES).await.unwrap(),
    ]
}

#[tokio::test]
async fn onboarding_submit_scenario() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        assert_eq!(sm.hydrate().await, AppState::Onboarding, "{name}");

        let profile = FormSpec::onboarding()
            .submit(&onboarding_draft("Ana", "ana@x.com"))
            .unwrap();
        sm.complete_onboarding(profile.clone()).await.unwrap();

        let [flag, user, _] = read_all(store.as_ref()).await;
        assert_eq!(flag.as_deref(), Some("true"), "{name}");
        assert_eq!(
            user.as_deref(),
            Some(r#"{"firstName":"Ana","email":"ana@x.com"}"#),
            "{name}"
        );

        // A fresh process over the same store
        let relaunched = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        assert_eq!(
            relaunched.hydrate().await,
            AppState::Authenticated(profile),
            "{name}"
        );
    }
}

#[tokio::test]
async fn round_trip_every_field() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        sm.hydrate().await;

        let profile = Profile::default()
            .with(ProfileField::FirstName, "Ana")
            .with(ProfileField::LastName, "Lima")
            .with(ProfileField::Email, "ana@x.com")
            .with(ProfileField::PhoneNumber, "+55 11 5555-0100")
            .with(ProfileField::Image, "file:///avatar.jpg");
        sm.complete_onboarding(profile.clone()).await.unwrap();

        let relaunched = ProfileStateMachine::new(store, WritePolicy::Atomic);
        assert_eq!(
            relaunched.hydrate().await,
            AppState::Authenticated(profile),
            "{name}"
        );
    }
}

#[tokio::test]
async fn update_profile_is_idempotent() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        sm.hydrate().await;
        sm.complete_onboarding(
            FormSpec::onboarding()
                .submit(&onboarding_draft("Ana", "ana@x.com"))
                .unwrap(),
        )
        .await
        .unwrap();

        let mut draft = Draft::from_profile(&sm.profile().await.unwrap());
        draft.set(ProfileField::LastName, "Lima");
        draft.set(ProfileField::PhoneNumber, "555-0100");
        let edited = FormSpec::profile().submit(&draft).unwrap();

        sm.update_profile(edited.clone()).await.unwrap();
        let first = read_all(store.as_ref()).await;
        sm.update_profile(edited).await.unwrap();
        let second = read_all(store.as_ref()).await;
        assert_eq!(first, second, "{name}");
    }
}

#[tokio::test]
async fn logout_clears_all_three_keys() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        sm.hydrate().await;
        sm.complete_onboarding(
            FormSpec::onboarding()
                .submit(&onboarding_draft("Ana", "ana@x.com"))
                .unwrap(),
        )
        .await
        .unwrap();
        sm.set_preference(NotificationLabel::SpecialOffers, true)
            .await
            .unwrap();
        sm.apply_avatar_pick(AvatarPick::Picked("file:///a.png".into()))
            .await
            .unwrap();

        assert_eq!(sm.logout().await.unwrap(), AppState::Onboarding, "{name}");
        assert_eq!(read_all(store.as_ref()).await, [None, None, None], "{name}");
        assert_eq!(sm.hydrate().await, AppState::Onboarding, "{name}");
        assert_eq!(sm.state().await.screen(), Some(ScreenTree::Onboarding));
    }
}

#[tokio::test]
async fn logout_from_inconsistent_store_clears_all_three_keys() {
    for (name, store) in stores().await {
        store.set(keys::ONBOARDING_COMPLETE, "true").await.unwrap();
        store.set(keys::USER_DATA, "not json").await.unwrap();
        store
            .set(keys::CHECKBOXES, r#"{"Newsletter":true}"#)
            .await
            .unwrap();

        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        assert_eq!(sm.hydrate().await, AppState::Onboarding, "{name}");

        assert_eq!(sm.logout().await.unwrap(), AppState::Onboarding, "{name}");
        assert_eq!(read_all(store.as_ref()).await, [None, None, None], "{name}");
        assert_eq!(sm.hydrate().await, AppState::Onboarding, "{name}");
    }
}

#[tokio::test]
async fn logout_while_loading_clears_all_three_keys() {
    for (name, store) in stores().await {
        store.set(keys::ONBOARDING_COMPLETE, "true").await.unwrap();
        store
            .set(keys::USER_DATA, r#"{"firstName":"Ana"}"#)
            .await
            .unwrap();

        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        assert!(sm.is_loading().await, "{name}");

        assert_eq!(sm.logout().await.unwrap(), AppState::Onboarding, "{name}");
        assert_eq!(read_all(store.as_ref()).await, [None, None, None], "{name}");
        assert_eq!(sm.state().await.screen(), Some(ScreenTree::Onboarding));
    }
}

#[tokio::test]
async fn malformed_user_data_falls_back_to_onboarding() {
    for (name, store) in stores().await {
        store.set(keys::ONBOARDING_COMPLETE, "true").await.unwrap();
        store.set(keys::USER_DATA, "definitely not json").await.unwrap();

        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        assert_eq!(sm.hydrate().await, AppState::Onboarding, "{name}");

        // Onboarding again repairs the pair
        sm.complete_onboarding(
            FormSpec::onboarding()
                .submit(&onboarding_draft("Ana", "ana@x.com"))
                .unwrap(),
        )
        .await
        .unwrap();
        assert!(sm.hydrate().await.onboarding_complete(), "{name}");
    }
}

#[tokio::test]
async fn preferences_default_to_false_on_fresh_store() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store, WritePolicy::Atomic);
        sm.hydrate().await;
        let prefs = sm.preferences().await;
        for label in NotificationLabel::ALL {
            assert!(!prefs.get(label), "{name}: {label}");
        }
    }
}

#[tokio::test]
async fn newsletter_toggle_leaves_other_labels() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        sm.hydrate().await;
        sm.complete_onboarding(
            FormSpec::onboarding()
                .submit(&onboarding_draft("Ana", "ana@x.com"))
                .unwrap(),
        )
        .await
        .unwrap();
        sm.set_preference(NotificationLabel::PasswordChanges, true)
            .await
            .unwrap();

        sm.set_preference_by_label("Newsletter", true).await.unwrap();

        let raw = store.get(keys::CHECKBOXES).await.unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored["Newsletter"], true, "{name}");
        assert_eq!(stored["Password changes"], true, "{name}");
        assert_eq!(stored["Order statuses"], false, "{name}");
        assert_eq!(stored["Special offers"], false, "{name}");
        assert!(sm.onboarding_complete().await, "{name}");
    }
}

#[tokio::test]
async fn empty_required_field_blocks_submit() {
    for (name, store) in stores().await {
        let sm = ProfileStateMachine::new(store.clone(), WritePolicy::Atomic);
        sm.hydrate().await;

        let result = FormSpec::onboarding().submit(&onboarding_draft("", "ana@x.com"));
        let err: Error = result.unwrap_err().into();
        assert_eq!(err.to_string(), "Validation error: First Name is required.");

        assert_eq!(read_all(store.as_ref()).await, [None, None, None], "{name}");
        assert_eq!(sm.state().await, AppState::Onboarding, "{name}");
    }
}

#[tokio::test]
async fn main_flow_navigation_after_hydrate() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let sm = ProfileStateMachine::new(store, WritePolicy::Atomic);
    assert!(sm.state().await.screen().is_none());

    sm.hydrate().await;
    sm.complete_onboarding(Profile::default().with(ProfileField::FirstName, "Ana"))
        .await
        .unwrap();

    let Some(ScreenTree::Main(mut nav)) = sm.state().await.screen() else {
        panic!("expected main flow");
    };
    assert_eq!(nav.current(), Route::Home);
    nav.navigate(Route::Profile);
    assert_eq!(nav.current(), Route::Profile);
    assert!(nav.go_back());
    assert_eq!(nav.current(), Route::Home);
}

#[tokio::test]
async fn file_backed_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.db");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_local(&path).await.unwrap());
        let sm = ProfileStateMachine::new(store, WritePolicy::Atomic);
        sm.hydrate().await;
        sm.complete_onboarding(Profile::default().with(ProfileField::FirstName, "Ana"))
            .await
            .unwrap();
        sm.set_preference(NotificationLabel::Newsletter, true)
            .await
            .unwrap();
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_local(&path).await.unwrap());
    let sm = ProfileStateMachine::new(store, WritePolicy::Atomic);
    let state = sm.hydrate().await;
    assert_eq!(
        state.profile().and_then(|p| p.first_name.as_deref()),
        Some("Ana")
    );
    assert!(sm.preferences().await.get(NotificationLabel::Newsletter));
}
