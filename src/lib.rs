//! profile-gate — persisted onboarding and profile state for a two-screen app.

pub mod config;
pub mod error;
pub mod form;
pub mod navigation;
pub mod profile;
pub mod store;
pub mod telemetry;
