//! Tracing/logging initialization.
//!
//! Logs are JSON lines with timestamps. The level filter comes from `RUST_LOG`
//! (e.g. `RUST_LOG=tillbook_infra=debug`) and defaults to `info`.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Filter from `RUST_LOG`, or [`DEFAULT_FILTER`] when unset or unparsable.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// Returns whether this call installed the subscriber. Later calls are no-ops and
/// return `false`.
pub fn init() -> bool {
    let mut installed = false;
    INSTALLED.get_or_init(|| {
        installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(true)
            .with_current_span(false)
            .try_init()
            .is_ok();
    });
    installed
}
