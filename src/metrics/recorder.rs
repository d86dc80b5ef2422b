//! BridgeRecorder trait for dependency injection
//!
//! The push bridge reports what it does through this trait, so it can run
//! with Prometheus-backed counters in production and with `NoopRecorder` (or
//! a counting mock) in tests.

use std::sync::Arc;

/// Push outcome label values
pub mod status {
    pub const SUCCESS: &str = "success";
    pub const GATHER_FAILED: &str = "gather_failed";
    pub const ENCODE_FAILED: &str = "encode_failed";
    pub const DELIVERY_FAILED: &str = "delivery_failed";
}

/// Trait for recording bridge activity.
///
/// All methods are no-op by default, allowing partial implementation.
/// Implementations must be thread-safe (Send + Sync).
#[allow(unused_variables)]
pub trait BridgeRecorder: Send + Sync {
    /// Record one push attempt and its outcome (see [`status`])
    fn inc_push(&self, status: &str) {}

    /// Observe how long a successful push took
    fn observe_push_duration(&self, duration_secs: f64) {}

    /// Record lines written to the sink
    fn add_lines_sent(&self, lines: u64) {}
}

/// Noop recorder for tests and unmetered bridges.
pub struct NoopRecorder;

impl BridgeRecorder for NoopRecorder {}

impl NoopRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn arc() -> Arc<dyn BridgeRecorder> {
        Arc::new(Self::new())
    }
}

impl Default for NoopRecorder {
    fn default() -> Self {
        Self::new()
    }
}
