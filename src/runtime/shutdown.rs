//! Cooperative shutdown
//!
//! A single `Shutdown` is created at the top of the process and cloned into
//! every task that must stop with it. The first reason recorded wins; later
//! cancellations are ignored.

use std::fmt;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ordinary, programmatic stop
    Requested,
    /// OS signal, e.g. Ctrl+C
    Signal(String),
    /// Stop forced by a failure elsewhere in the process
    Fault(String),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "shutdown requested"),
            Self::Signal(name) => write!(f, "received signal {}", name),
            Self::Fault(msg) => write!(f, "shutdown after fault: {}", msg),
        }
    }
}

#[derive(Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<Option<ShutdownReason>>>,
    receiver: watch::Receiver<Option<ShutdownReason>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) -> bool {
        self.cancel_with(ShutdownReason::Requested)
    }

    /// Record `reason` and wake every waiter.
    ///
    /// Returns `false` if the signal had already fired.
    pub fn cancel_with(&self, reason: ShutdownReason) -> bool {
        self.sender.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.receiver.borrow().clone()
    }

    /// Resolves once the signal fires, returning its reason.
    pub async fn cancelled(&self) -> ShutdownReason {
        let mut receiver = self.receiver.clone();
        receiver
            .wait_for(Option::is_some)
            .await
            .map(|current| (*current).clone())
            .ok()
            .flatten()
            // The sender lives as long as any clone, so this is unreachable
            // in practice.
            .unwrap_or(ShutdownReason::Requested)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for Ctrl+C and fire `shutdown`.
pub async fn listen_for_shutdown(shutdown: Shutdown) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping metrics service...");
            shutdown.cancel_with(ShutdownReason::Signal("ctrl_c".to_string()));
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
            shutdown.cancel_with(ShutdownReason::Fault(e.to_string()));
        }
    }
}
