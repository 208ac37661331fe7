//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: env-filtered, UTC timestamps.
///
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
