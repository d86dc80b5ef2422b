//! Push bridge lifecycle
//!
//! `Idle → Running → Stopped`. A bridge is built idle, `run` consumes it, and
//! it only stops when its shutdown signal fires. Each tick gathers, encodes
//! and delivers; a failed tick is counted and logged and the loop carries on
//! with the next one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::time::{self, MissedTickBehavior};
use tracing::{Level, debug, info, warn};

use super::config::BridgeConfig;
use super::graphite;
use super::transport::{PushTransport, TcpTransport};
use crate::errors::Result;
use crate::metrics::gatherer::Gatherer;
use crate::metrics::recorder::{BridgeRecorder, NoopRecorder, status};
use crate::runtime::shutdown::Shutdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Running,
    Stopped,
}

impl BridgeState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Shared view of a bridge's progress; stays valid after `run` consumes the
/// bridge.
#[derive(Clone, Default)]
pub struct BridgeStats {
    state: Arc<AtomicU8>,
    pushes: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

impl BridgeStats {
    pub fn state(&self) -> BridgeState {
        BridgeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Ticks that delivered successfully
    pub fn pushes(&self) -> u64 {
        self.pushes.load(Ordering::Relaxed)
    }

    /// Ticks that failed to gather or deliver
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn set_state(&self, state: BridgeState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

pub struct Bridge {
    config: BridgeConfig,
    gatherer: Arc<dyn Gatherer>,
    transport: Arc<dyn PushTransport>,
    recorder: Arc<dyn BridgeRecorder>,
    trim_prefix: String,
    stats: BridgeStats,
}

impl Bridge {
    /// Validate `config` and build an idle bridge over TCP.
    pub fn new(config: BridgeConfig, gatherer: Arc<dyn Gatherer>) -> Result<Self> {
        config.validate()?;

        let transport = Arc::new(TcpTransport::new(config.address.clone(), config.timeout));
        Ok(Self {
            config,
            gatherer,
            transport,
            recorder: NoopRecorder::arc(),
            trim_prefix: String::new(),
            stats: BridgeStats::default(),
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn BridgeRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Namespace stripped from family names before they become Graphite paths
    pub fn with_trim_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trim_prefix = prefix.into();
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats.clone()
    }

    pub fn state(&self) -> BridgeState {
        self.stats.state()
    }

    /// One tick: gather, filter, encode and deliver. Returns the line count.
    pub async fn push(&self, now: DateTime<Utc>) -> Result<u64> {
        let started = Instant::now();

        let snapshot = match self.gatherer.gather() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.recorder.inc_push(status::GATHER_FAILED);
                return Err(e);
            }
        };

        let families: Vec<_> = snapshot
            .into_iter()
            .filter(|f| f.name().is_some_and(|name| self.config.accepts(name)))
            .collect();

        let payload = match graphite::encode(&families, &self.config.prefix, &self.trim_prefix, now) {
            Ok(payload) => payload,
            Err(e) => {
                self.recorder.inc_push(status::ENCODE_FAILED);
                return Err(e);
            }
        };
        if payload.lines == 0 {
            debug!("Graphite bridge: nothing to push");
            return Ok(0);
        }

        if let Err(e) = self.transport.send(payload.body.as_bytes()).await {
            self.recorder.inc_push(status::DELIVERY_FAILED);
            return Err(e);
        }

        self.recorder.inc_push(status::SUCCESS);
        self.recorder
            .observe_push_duration(started.elapsed().as_secs_f64());
        self.recorder.add_lines_sent(payload.lines);
        Ok(payload.lines)
    }

    /// Push every interval until `shutdown` fires.
    ///
    /// The first push happens one interval after start. Shutdown is only
    /// checked between ticks: a push already in flight runs to completion,
    /// bounded by the transport timeout, and no further tick is scheduled.
    pub async fn run(self, shutdown: Shutdown) {
        self.stats.set_state(BridgeState::Running);
        info!(
            address = %self.config.address,
            interval = ?self.config.interval,
            "Graphite bridge started"
        );

        let period = self.config.interval;
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                biased;
                reason = shutdown.cancelled() => {
                    debug!(%reason, "Graphite bridge received shutdown");
                    break;
                }
                _ = ticker.tick() => {}
            }

            match self.push(Utc::now()).await {
                Ok(lines) => {
                    consecutive_failures = 0;
                    self.stats.pushes.fetch_add(1, Ordering::Relaxed);
                    debug!(lines, "Graphite bridge push complete");
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    self.stats.failures.fetch_add(1, Ordering::Relaxed);
                    let level = failure_level(consecutive_failures, self.config.max_logged_failures);
                    if level == Level::WARN {
                        warn!(error = %e, consecutive_failures, "Error pushing to Graphite");
                    } else {
                        debug!(error = %e, consecutive_failures, "Error pushing to Graphite");
                    }
                }
            }
        }

        self.stats.set_state(BridgeState::Stopped);
        info!("Graphite bridge stopped");
    }
}

/// Level for the `consecutive`-th failure in a row: the first
/// `max_logged` are warnings, the rest are demoted to debug.
fn failure_level(consecutive: u32, max_logged: u32) -> Level {
    if consecutive <= max_logged {
        Level::WARN
    } else {
        Level::DEBUG
    }
}
