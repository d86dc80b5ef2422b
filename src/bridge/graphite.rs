//! Graphite plaintext protocol encoding
//!
//! One line per sample: `<prefix><path>[.<label>.<value>]* <value> <unix_seconds>`.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::errors::{MetricsError, Result};
use crate::metrics::exposition::format_value;
use crate::metrics::snapshot::{LabelPair, MetricFamily};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphitePayload {
    pub body: String,
    pub lines: u64,
}

/// Encode a snapshot for a push at `now`.
///
/// `trim_prefix` is removed from family names first, so the application
/// namespace does not repeat inside the Graphite path. Non-finite values
/// cannot be stored by Graphite and are skipped. Two samples that land on
/// the same path would overwrite each other in the sink, so that is an error.
pub fn encode(
    snapshot: &[MetricFamily],
    prefix: &str,
    trim_prefix: &str,
    now: DateTime<Utc>,
) -> Result<GraphitePayload> {
    let timestamp = now.timestamp();
    let mut payload = GraphitePayload::default();
    let mut seen = HashSet::new();

    for family in snapshot {
        let Some(name) = family.name() else {
            continue;
        };
        let path = name.strip_prefix(trim_prefix).unwrap_or(name);

        for sample in &family.samples {
            if !sample.value.is_finite() {
                continue;
            }

            let mut series = String::from(prefix);
            write_sanitized(&mut series, path);
            write_sanitized(&mut series, &sample.suffix);

            let mut labels: Vec<&LabelPair> = sample.labels.iter().collect();
            labels.sort_by(|a, b| a.name.cmp(&b.name));
            for label in labels {
                series.push('.');
                write_sanitized(&mut series, &label.name);
                series.push('.');
                write_sanitized(&mut series, &label.value);
            }

            if seen.contains(&series) {
                return Err(MetricsError::duplicate_metric_name(series));
            }
            let _ = writeln!(
                payload.body,
                "{} {} {}",
                series,
                format_value(sample.value),
                timestamp
            );
            seen.insert(series);
            payload.lines += 1;
        }
    }

    Ok(payload)
}

/// Spaces become path separators, anything outside `[a-zA-Z0-9_:-]` becomes
/// `_`, and runs of `_` within `s` collapse to one.
fn write_sanitized(out: &mut String, s: &str) {
    let mut prev_underscore = false;
    for c in s.chars() {
        let c = match c {
            ' ' => '.',
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | ':' | '-' => c,
            _ => '_',
        };
        if c == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::snapshot::{MetricType, Sample};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_counter_line() {
        let families = vec![
            MetricFamily::new("grafana_api_requests_total", "", MetricType::Counter)
                .with_sample(Sample::new(12.0)),
        ];
        let payload = encode(&families, "prod.grafana.", "grafana_", at()).unwrap();
        assert_eq!(payload.body, "prod.grafana.api_requests_total 12 1700000000\n");
        assert_eq!(payload.lines, 1);
    }

    #[test]
    fn test_labels_are_sorted_and_sanitized() {
        let families = vec![
            MetricFamily::new("grafana_http_requests", "", MetricType::Counter).with_sample(
                Sample::new(3.0)
                    .with_label("route", "/api/dash boards")
                    .with_label("method", "GET"),
            ),
        ];
        let payload = encode(&families, "", "grafana_", at()).unwrap();
        assert_eq!(
            payload.body,
            "http_requests.method.GET.route._api_dash.boards 3 1700000000\n"
        );
    }

    #[test]
    fn test_histogram_series_and_infinite_bucket_label() {
        let families = vec![
            MetricFamily::new("grafana_latency_seconds", "", MetricType::Histogram)
                .with_sample(Sample::new(4.0).with_suffix("_bucket").with_label("le", "+Inf"))
                .with_sample(Sample::new(0.5).with_suffix("_sum")),
        ];
        let payload = encode(&families, "", "grafana_", at()).unwrap();
        assert_eq!(
            payload.body,
            "latency_seconds_bucket.le._Inf 4 1700000000\nlatency_seconds_sum 0.5 1700000000\n"
        );
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let families = vec![
            MetricFamily::new("ratio", "", MetricType::Gauge)
                .with_sample(Sample::new(f64::NAN))
                .with_sample(Sample::new(f64::INFINITY))
                .with_sample(Sample::new(0.75)),
        ];
        let payload = encode(&families, "", "grafana_", at()).unwrap();
        assert_eq!(payload.body, "ratio 0.75 1700000000\n");
        assert_eq!(payload.lines, 1);
    }

    #[test]
    fn test_underscore_runs_collapse() {
        let mut out = String::new();
        write_sanitized(&mut out, "a__b//c");
        assert_eq!(out, "a_b_c");
    }

    #[test]
    fn test_trimmed_name_colliding_with_untrimmed_is_rejected() {
        let families = vec![
            MetricFamily::new("grafana_x", "", MetricType::Gauge).with_sample(Sample::new(1.0)),
            MetricFamily::new("x", "", MetricType::Gauge).with_sample(Sample::new(2.0)),
        ];
        let err = encode(&families, "prod.grafana.", "grafana_", at()).unwrap_err();
        assert_eq!(err, MetricsError::duplicate_metric_name("prod.grafana.x"));
    }

    #[test]
    fn test_trailing_underscore_name_keeps_suffix_distinct() {
        let families = vec![
            MetricFamily::new("foo_", "", MetricType::Histogram)
                .with_sample(Sample::new(1.0).with_suffix("_bucket")),
            MetricFamily::new("foo_bucket", "", MetricType::Gauge).with_sample(Sample::new(2.0)),
        ];
        let payload = encode(&families, "", "", at()).unwrap();
        assert_eq!(payload.body, "foo__bucket 1 1700000000\nfoo_bucket 2 1700000000\n");
        assert_eq!(payload.lines, 2);
    }
}
