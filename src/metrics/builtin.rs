//! Built-in metrics
//!
//! Collectors owned by the metrics subsystem itself. They are registered on
//! whichever registerer is active at startup; a registration failure aborts
//! startup.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry};

use super::recorder::BridgeRecorder;
use crate::errors::Result;

/// Push latency buckets, in seconds
const PUSH_DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0];

#[derive(Clone)]
pub struct BuiltinMetrics {
    /// Incremented once each time the service starts
    pub instance_start_total: IntCounter,

    /// Constant 1, labelled with the crate version
    pub build_info: IntGaugeVec,

    // ===== Push bridge =====
    pub bridge_pushes_total: IntCounterVec,
    pub bridge_push_duration_seconds: Histogram,
    pub bridge_lines_sent_total: IntCounter,
}

impl BuiltinMetrics {
    /// Create the collectors under `prefix` and register them on `registry`.
    pub fn register(registry: &Registry, prefix: &str) -> Result<Self> {
        let instance_start_total = IntCounter::new(
            format!("{}instance_start_total", prefix),
            "Number of times the metrics service has started",
        )?;

        let build_info = IntGaugeVec::new(
            Opts::new(
                format!("{}build_info", prefix),
                "Build information, value is always 1",
            ),
            &["version"],
        )?;

        let bridge_pushes_total = IntCounterVec::new(
            Opts::new(
                format!("{}graphite_bridge_pushes_total", prefix),
                "Graphite bridge push attempts by outcome",
            ),
            &["status"],
        )?;

        let bridge_push_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                format!("{}graphite_bridge_push_duration_seconds", prefix),
                "Duration of successful Graphite bridge pushes",
            )
            .buckets(PUSH_DURATION_BUCKETS.to_vec()),
        )?;

        let bridge_lines_sent_total = IntCounter::new(
            format!("{}graphite_bridge_lines_sent_total", prefix),
            "Lines delivered to the Graphite sink",
        )?;

        registry.register(Box::new(instance_start_total.clone()))?;
        registry.register(Box::new(build_info.clone()))?;
        registry.register(Box::new(bridge_pushes_total.clone()))?;
        registry.register(Box::new(bridge_push_duration_seconds.clone()))?;
        registry.register(Box::new(bridge_lines_sent_total.clone()))?;

        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);

        Ok(Self {
            instance_start_total,
            build_info,
            bridge_pushes_total,
            bridge_push_duration_seconds,
            bridge_lines_sent_total,
        })
    }
}

impl BridgeRecorder for BuiltinMetrics {
    fn inc_push(&self, status: &str) {
        self.bridge_pushes_total.with_label_values(&[status]).inc();
    }

    fn observe_push_duration(&self, duration_secs: f64) {
        self.bridge_push_duration_seconds.observe(duration_secs);
    }

    fn add_lines_sent(&self, lines: u64) {
        self.bridge_lines_sent_total.inc_by(lines);
    }
}
