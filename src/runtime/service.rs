//! Metrics service lifecycle
//!
//! Owns the background work of the metrics subsystem: the Graphite bridge
//! (when configured) and the process metrics updater. `run` marks the
//! instance as started and then waits for shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "process-metrics")]
use std::time::Duration;

use prometheus::Registry;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::shutdown::{Shutdown, ShutdownReason};
use crate::bridge::{Bridge, BridgeConfig, PushTransport};
use crate::config::AppConfig;
use crate::errors::{MetricsError, Result};
use crate::metrics::builtin::BuiltinMetrics;
use crate::metrics::gatherer::Gatherer;
#[cfg(feature = "process-metrics")]
use crate::metrics::process::ProcessMetrics;

pub struct MetricsService {
    metrics: BuiltinMetrics,
    gatherer: Arc<dyn Gatherer>,
    bridge_config: Option<BridgeConfig>,
    /// Overrides the bridge's TCP transport
    transport: Option<Arc<dyn PushTransport>>,
    primary_prefix: String,
    #[cfg(feature = "process-metrics")]
    process: Option<(Arc<ProcessMetrics>, Duration)>,
    started: AtomicBool,
}

impl MetricsService {
    /// Register the built-in collectors on `registerer` and prepare the
    /// service. Registration failures are returned, not logged.
    pub fn new(config: &AppConfig, registerer: &Registry, gatherer: Arc<dyn Gatherer>) -> Result<Self> {
        let metrics = BuiltinMetrics::register(registerer, &config.metrics.primary_prefix)?;

        #[cfg(feature = "process-metrics")]
        let process = if config.metrics.process_metrics {
            let process = ProcessMetrics::register(registerer, &config.metrics.runtime_prefix)?;
            let period = Duration::from_secs(config.metrics.interval_seconds.max(1));
            Some((Arc::new(process), period))
        } else {
            None
        };

        Ok(Self {
            metrics,
            gatherer,
            bridge_config: config.bridge_config(),
            transport: None,
            primary_prefix: config.metrics.primary_prefix.clone(),
            #[cfg(feature = "process-metrics")]
            process,
            started: AtomicBool::new(false),
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn bridge_config(&self) -> Option<&BridgeConfig> {
        self.bridge_config.as_ref()
    }

    pub fn metrics(&self) -> &BuiltinMetrics {
        &self.metrics
    }

    /// Run until `shutdown` fires. May be called once.
    ///
    /// Returns `Ok(())` for a requested shutdown and `Cancelled` carrying the
    /// reason otherwise. Bridge problems never surface here: a bridge that
    /// cannot be built is logged and skipped, and push failures stay inside
    /// the bridge.
    pub async fn run(&self, shutdown: Shutdown) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(MetricsError::AlreadyRunning);
        }

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        if let Some(bridge) = self.build_bridge() {
            tasks.push(tokio::spawn(bridge.run(shutdown.clone())));
        }

        #[cfg(feature = "process-metrics")]
        if let Some((process, period)) = &self.process {
            let process = process.clone();
            let period = *period;
            let shutdown = shutdown.clone();
            tasks.push(tokio::spawn(async move {
                process.run(period, shutdown).await;
            }));
        }

        self.metrics.instance_start_total.inc();
        info!(background_tasks = tasks.len(), "Metrics service started");

        let reason = shutdown.cancelled().await;

        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Metrics background task ended abnormally");
            }
        }
        info!(%reason, "Metrics service stopped");

        match reason {
            ShutdownReason::Requested => Ok(()),
            other => Err(MetricsError::Cancelled(other)),
        }
    }

    fn build_bridge(&self) -> Option<Bridge> {
        let config = self.bridge_config.clone()?;

        match Bridge::new(config, self.gatherer.clone()) {
            Ok(bridge) => {
                let bridge = bridge
                    .with_recorder(Arc::new(self.metrics.clone()))
                    .with_trim_prefix(self.primary_prefix.as_str());
                Some(match &self.transport {
                    Some(transport) => bridge.with_transport(transport.clone()),
                    None => bridge,
                })
            }
            Err(e) => {
                error!(error = %e, "Failed to create graphite bridge, continuing without it");
                None
            }
        }
    }
}
