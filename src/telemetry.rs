//! Tracing setup for hosts embedding the state machine.

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.log_filter` is used. Fails
/// instead of panicking if a subscriber is already installed.
pub fn init(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .try_init()
}
