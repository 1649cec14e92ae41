//! Tracing/logging setup shared by deposit tooling.

/// Initialize process-wide tracing for a deposit run.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
