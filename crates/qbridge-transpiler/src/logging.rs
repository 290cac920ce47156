//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::TranspilerConfig;

/// Install a global fmt subscriber filtered at `level`.
///
/// Falls back to `RUST_LOG`, then to `info`, when `level` is not a valid
/// filter directive. Returns `false` if a global subscriber was already set.
pub fn init_tracing(level: &str) -> bool {
    let env_filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// [`init_tracing`] at the configured log level.
pub fn init_tracing_from_config(config: &TranspilerConfig) -> bool {
    init_tracing(&config.logging.level)
}
