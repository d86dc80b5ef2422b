//! Graphite push bridge
//!
//! Periodically gathers a snapshot and forwards it to a Graphite plaintext
//! listener, for deployments where the sink cannot scrape.

pub mod config;
pub mod graphite;
pub mod runner;
pub mod transport;

pub use config::BridgeConfig;
pub use runner::{Bridge, BridgeState, BridgeStats};
pub use transport::{PushTransport, TcpTransport};
