//! Tracing subscriber setup.

use divmon_types::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `config.level`. Returns false when a subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(level = %config.level, "Logging initialized");
    }
    installed
}
