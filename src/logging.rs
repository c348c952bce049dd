//! Logging setup for the binary.
//!
//! Installs a global tracing subscriber filtered by `RUST_LOG`, defaulting
//! to `info`. Pipeline reports stay on stdout; tracing carries diagnostics.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
