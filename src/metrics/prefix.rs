//! Name-prefixing gatherer
//!
//! Sibling subsystems register metrics without agreeing on a naming
//! convention. `PrefixingGatherer` puts every family under the application
//! namespace at gather time, leaving names that already carry a reserved
//! prefix alone, and refuses to serve a snapshot in which two families end
//! up with the same name after the rewrite.

use std::collections::HashSet;

use tracing::trace;

use super::gatherer::Gatherer;
use super::snapshot::MetricFamily;
use crate::errors::{MetricsError, Result};

pub const DEFAULT_PRIMARY_PREFIX: &str = "grafana_";
pub const DEFAULT_RUNTIME_PREFIX: &str = "process_";

/// Namespaces exempt from renaming.
///
/// The primary prefix is also the one prepended to every other name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedPrefixes {
    primary: String,
    others: Vec<String>,
}

impl ReservedPrefixes {
    pub fn new<I, S>(primary: impl Into<String>, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary: primary.into(),
            others: others
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(self.primary.as_str())
            || self.others.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl Default for ReservedPrefixes {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_PREFIX, [DEFAULT_RUNTIME_PREFIX])
    }
}

pub struct PrefixingGatherer<G> {
    inner: G,
    prefixes: ReservedPrefixes,
}

impl<G: Gatherer> PrefixingGatherer<G> {
    pub fn new(inner: G, prefixes: ReservedPrefixes) -> Self {
        Self { inner, prefixes }
    }

    pub fn prefixes(&self) -> &ReservedPrefixes {
        &self.prefixes
    }
}

impl<G: Gatherer> Gatherer for PrefixingGatherer<G> {
    fn gather(&self) -> Result<Vec<MetricFamily>> {
        let mut families = self.inner.gather()?;

        // Call-local: concurrent gathers never share it.
        let mut seen: HashSet<String> = HashSet::with_capacity(families.len());

        for (index, family) in families.iter_mut().enumerate() {
            let Some(name) = family.name() else {
                return Err(MetricsError::UnnamedMetricFamily(index));
            };

            let name = if self.prefixes.matches(name) {
                name.to_string()
            } else {
                let renamed = format!("{}{}", self.prefixes.primary(), name);
                trace!(from = name, to = %renamed, "Prefixing metric family");
                family.name = Some(renamed.clone());
                renamed
            };

            if !seen.insert(name.clone()) {
                return Err(MetricsError::duplicate_metric_name(name));
            }
        }

        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::gatherer::StaticGatherer;
    use crate::metrics::snapshot::{MetricType, Sample, family_names};

    fn gatherer_for(names: &[&str]) -> PrefixingGatherer<StaticGatherer> {
        let families = names
            .iter()
            .map(|n| MetricFamily::new(*n, "", MetricType::Counter).with_sample(Sample::new(1.0)))
            .collect();
        PrefixingGatherer::new(StaticGatherer::new(families), ReservedPrefixes::default())
    }

    #[test]
    fn test_reserved_prefix_matching() {
        let prefixes = ReservedPrefixes::default();
        assert!(prefixes.matches("grafana_up"));
        assert!(prefixes.matches("process_cpu_seconds_total"));
        assert!(!prefixes.matches("up"));
        assert!(!prefixes.matches("grafanaup"));
    }

    #[test]
    fn test_empty_extra_prefix_is_ignored() {
        let prefixes = ReservedPrefixes::new("app_", [""]);
        assert!(!prefixes.matches("anything"));
    }

    #[test]
    fn test_unprefixed_name_is_rewritten() {
        let families = gatherer_for(&["up", "grafana_http_requests_total"])
            .gather()
            .unwrap();
        assert_eq!(
            family_names(&families),
            vec!["grafana_up", "grafana_http_requests_total"]
        );
    }

    #[test]
    fn test_collision_after_rewrite_fails() {
        let err = gatherer_for(&["grafana_x", "x"]).gather().unwrap_err();
        assert_eq!(err, MetricsError::DuplicateMetricName("grafana_x".into()));
        assert!(err.to_string().contains("grafana_x"));
    }

    #[test]
    fn test_collision_is_detected_in_either_order() {
        let err = gatherer_for(&["x", "grafana_x"]).gather().unwrap_err();
        assert_eq!(err, MetricsError::DuplicateMetricName("grafana_x".into()));
    }

    #[test]
    fn test_unnamed_family_is_rejected() {
        let mut nameless = MetricFamily::new("", "", MetricType::Gauge);
        nameless.name = None;
        let upstream = StaticGatherer::new(vec![
            MetricFamily::new("up", "", MetricType::Gauge),
            nameless,
        ]);
        let err = PrefixingGatherer::new(upstream, ReservedPrefixes::default())
            .gather()
            .unwrap_err();
        assert_eq!(err, MetricsError::UnnamedMetricFamily(1));
    }

    #[test]
    fn test_samples_survive_rename() {
        let families = gatherer_for(&["jobs"]).gather().unwrap();
        assert_eq!(families[0].samples.len(), 1);
        assert_eq!(families[0].series_name(&families[0].samples[0]), "grafana_jobs");
    }
}
