//! Process metrics collection
//!
//! Collects process-level metrics like memory and CPU time using sysinfo,
//! published under the runtime prefix. A background task refreshes them
//! until shutdown.

use std::sync::Mutex;
use std::time::Duration;

use prometheus::{Gauge, Registry};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::runtime::shutdown::Shutdown;

pub struct ProcessMetrics {
    resident_memory_bytes: Gauge,
    virtual_memory_bytes: Gauge,
    cpu_seconds: Gauge,
    system: Mutex<System>,
    pid: Pid,
}

impl ProcessMetrics {
    pub fn register(registry: &Registry, prefix: &str) -> Result<Self> {
        let resident_memory_bytes = Gauge::new(
            format!("{}resident_memory_bytes", prefix),
            "Resident memory size in bytes",
        )?;
        let virtual_memory_bytes = Gauge::new(
            format!("{}virtual_memory_bytes", prefix),
            "Virtual memory size in bytes",
        )?;
        let cpu_seconds = Gauge::new(
            format!("{}cpu_seconds", prefix),
            "Total user and system CPU time spent in seconds",
        )?;

        registry.register(Box::new(resident_memory_bytes.clone()))?;
        registry.register(Box::new(virtual_memory_bytes.clone()))?;
        registry.register(Box::new(cpu_seconds.clone()))?;

        Ok(Self {
            resident_memory_bytes,
            virtual_memory_bytes,
            cpu_seconds,
            system: Mutex::new(System::new()),
            pid: Pid::from_u32(std::process::id()),
        })
    }

    /// Refresh memory and CPU time for the current process
    pub fn refresh(&self) {
        let mut sys = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Process metrics mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        };

        // Refresh only the current process
        sys.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);

        if let Some(process) = sys.process(self.pid) {
            self.resident_memory_bytes.set(process.memory() as f64);
            self.virtual_memory_bytes.set(process.virtual_memory() as f64);

            // accumulated in milliseconds
            let cpu_time_ms = process.accumulated_cpu_time();
            self.cpu_seconds.set(cpu_time_ms as f64 / 1000.0);
        }
    }

    /// Refresh every `period` until `shutdown` fires.
    pub async fn run(&self, period: Duration, shutdown: Shutdown) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh(),
                reason = shutdown.cancelled() => {
                    debug!(%reason, "Process metrics updater stopped");
                    return;
                }
            }
        }
    }
}
