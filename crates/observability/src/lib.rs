//! Tracing and logging setup shared by every binary that embeds the tillbook services.

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; returns whether this call installed the subscriber.
pub fn init() -> bool {
    tracing::init()
}

/// Tracing configuration (filters, layers).
pub mod tracing;
