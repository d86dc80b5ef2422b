//! Push sink transport
//!
//! Delivery is best effort: one attempt per push, no retry, no queue.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::errors::{MetricsError, Result};

#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver one encoded payload.
    async fn send(&self, payload: &[u8]) -> Result<()>;
}

/// Graphite plaintext over a fresh TCP connection per push.
pub struct TcpTransport {
    address: String,
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PushTransport for TcpTransport {
    async fn send(&self, payload: &[u8]) -> Result<()> {
        let mut stream = timeout(self.timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| {
                MetricsError::bridge_delivery(format!(
                    "connecting to {} timed out after {:?}",
                    self.address, self.timeout
                ))
            })?
            .map_err(|e| {
                MetricsError::bridge_delivery(format!("connecting to {}: {}", self.address, e))
            })?;

        timeout(self.timeout, async {
            stream.write_all(payload).await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| {
            MetricsError::bridge_delivery(format!(
                "writing to {} timed out after {:?}",
                self.address, self.timeout
            ))
        })?
        .map_err(|e| MetricsError::bridge_delivery(format!("writing to {}: {}", self.address, e)))?;

        trace!(address = %self.address, bytes = payload.len(), "Payload delivered");
        Ok(())
    }
}
