//! Gatherer capability
//!
//! Anything that can produce a full snapshot on demand. Implementations must
//! be safe to call from concurrent scrapes and from the push bridge tick.

use std::sync::Arc;

use prometheus::{Registry, proto};

use super::exposition::format_value;
use super::snapshot::{LabelPair, MetricFamily, MetricType, Sample};
use crate::errors::Result;

pub trait Gatherer: Send + Sync {
    /// Produce a fresh snapshot. The caller owns the result.
    fn gather(&self) -> Result<Vec<MetricFamily>>;
}

impl<G: Gatherer + ?Sized> Gatherer for Arc<G> {
    fn gather(&self) -> Result<Vec<MetricFamily>> {
        (**self).gather()
    }
}

impl<G: Gatherer + ?Sized> Gatherer for Box<G> {
    fn gather(&self) -> Result<Vec<MetricFamily>> {
        (**self).gather()
    }
}

/// A prometheus registry gathers by converting its proto families, series
/// for series as `prometheus::TextEncoder` would write them.
impl Gatherer for Registry {
    fn gather(&self) -> Result<Vec<MetricFamily>> {
        Ok(Registry::gather(self).iter().map(convert_family).collect())
    }
}

fn convert_family(mf: &proto::MetricFamily) -> MetricFamily {
    let kind = MetricType::from(mf.get_field_type());
    let mut family = MetricFamily::new(mf.name(), mf.help(), kind);

    for m in mf.get_metric() {
        let labels: Vec<LabelPair> = m
            .get_label()
            .iter()
            .map(|lp| LabelPair::new(lp.name(), lp.value()))
            .collect();
        let timestamp_ms = Some(m.timestamp_ms()).filter(|ts| *ts != 0);
        let series = |suffix: &str, extra: Option<(&str, String)>, value: f64| {
            let mut sample = Sample::new(value).with_suffix(suffix);
            sample.labels = labels.clone();
            if let Some((name, label_value)) = extra {
                sample.labels.push(LabelPair::new(name, label_value));
            }
            sample.timestamp_ms = timestamp_ms;
            sample
        };

        match kind {
            MetricType::Counter => family.samples.push(series("", None, m.get_counter().get_value())),
            MetricType::Gauge => family.samples.push(series("", None, m.get_gauge().get_value())),
            MetricType::Untyped => family.samples.push(series("", None, m.get_untyped().get_value())),
            MetricType::Histogram => {
                let h = m.get_histogram();
                let mut inf_seen = false;
                for b in h.get_bucket() {
                    let upper_bound = b.upper_bound();
                    inf_seen |= upper_bound == f64::INFINITY;
                    family.samples.push(series(
                        "_bucket",
                        Some(("le", format_value(upper_bound))),
                        b.cumulative_count() as f64,
                    ));
                }
                if !inf_seen {
                    family.samples.push(series(
                        "_bucket",
                        Some(("le", format_value(f64::INFINITY))),
                        h.get_sample_count() as f64,
                    ));
                }
                family.samples.push(series("_sum", None, h.get_sample_sum()));
                family.samples.push(series("_count", None, h.get_sample_count() as f64));
            }
            MetricType::Summary => {
                let s = m.get_summary();
                for q in s.get_quantile() {
                    family.samples.push(series(
                        "",
                        Some(("quantile", format_value(q.quantile()))),
                        q.value(),
                    ));
                }
                family.samples.push(series("_sum", None, s.sample_sum()));
                family.samples.push(series("_count", None, s.sample_count() as f64));
            }
        }
    }

    family
}

/// Fixed snapshot, useful for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGatherer {
    families: Vec<MetricFamily>,
}

impl StaticGatherer {
    pub fn new(families: Vec<MetricFamily>) -> Self {
        Self { families }
    }
}

impl Gatherer for StaticGatherer {
    fn gather(&self) -> Result<Vec<MetricFamily>> {
        Ok(self.families.clone())
    }
}
