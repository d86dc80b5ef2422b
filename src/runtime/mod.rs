//! Service lifecycle
//!
//! - `shutdown`: cooperative cancellation and the Ctrl+C listener
//! - `service`: the long-running metrics service
//! - `startup`: registry selection and service assembly

pub mod service;
pub mod shutdown;
pub mod startup;

pub use service::MetricsService;
pub use shutdown::{Shutdown, ShutdownReason, listen_for_shutdown};
pub use startup::{
    StartupContext, prepare_metrics, provide_gatherer, provide_gatherer_for_test,
    provide_registerer, provide_registerer_for_test, shared_registry,
};
