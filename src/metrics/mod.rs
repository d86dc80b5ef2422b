//! Metric gathering
//!
//! Snapshot model, text exposition codec, the `Gatherer` capability with its
//! name-prefixing wrapper, and the subsystem's own collectors.

pub mod builtin;
pub mod exposition;
pub mod gatherer;
pub mod prefix;
#[cfg(feature = "process-metrics")]
pub mod process;
pub mod recorder;
pub mod snapshot;

pub use builtin::BuiltinMetrics;
pub use gatherer::{Gatherer, StaticGatherer};
pub use prefix::{PrefixingGatherer, ReservedPrefixes};
pub use recorder::{BridgeRecorder, NoopRecorder};
pub use snapshot::{LabelPair, MetricFamily, MetricType, Sample};
