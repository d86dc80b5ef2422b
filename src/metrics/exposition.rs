//! Prometheus text exposition format
//!
//! Renders a snapshot the way a scrape endpoint serves it. For snapshots
//! read from a `prometheus::Registry` the output matches
//! `prometheus::TextEncoder` line for line.

use std::fmt::Write;

use crate::metrics::snapshot::MetricFamily;

/// Render a snapshot in the text exposition format.
///
/// Nameless families cannot be addressed by a scraper and are skipped.
pub fn encode(snapshot: &[MetricFamily]) -> String {
    let mut out = String::new();

    for family in snapshot {
        let Some(name) = family.name() else {
            tracing::debug!("Skipping nameless metric family during encode");
            continue;
        };

        if !family.help.is_empty() {
            let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
        }
        let _ = writeln!(out, "# TYPE {} {}", name, family.kind);

        for sample in &family.samples {
            out.push_str(name);
            out.push_str(&sample.suffix);
            if !sample.labels.is_empty() {
                out.push('{');
                for (i, label) in sample.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{}=\"{}\"", label.name, escape_label_value(&label.value));
                }
                out.push('}');
            }
            out.push(' ');
            out.push_str(&format_value(sample.value));
            if let Some(ts) = sample.timestamp_ms {
                let _ = write!(out, " {}", ts);
            }
            out.push('\n');
        }
    }

    out
}

pub(crate) fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::snapshot::{MetricType, Sample};

    #[test]
    fn test_encode_histogram() {
        let families = vec![
            MetricFamily::new("request_seconds", "Request latency.", MetricType::Histogram)
                .with_sample(
                    Sample::new(3.0)
                        .with_suffix("_bucket")
                        .with_label("route", "/api")
                        .with_label("le", "0.5"),
                )
                .with_sample(
                    Sample::new(4.0)
                        .with_suffix("_bucket")
                        .with_label("route", "/api")
                        .with_label("le", "+Inf"),
                )
                .with_sample(Sample::new(1.25).with_suffix("_sum").with_label("route", "/api"))
                .with_sample(Sample::new(4.0).with_suffix("_count").with_label("route", "/api")),
        ];

        assert_eq!(
            encode(&families),
            "\
# HELP request_seconds Request latency.
# TYPE request_seconds histogram
request_seconds_bucket{route=\"/api\",le=\"0.5\"} 3
request_seconds_bucket{route=\"/api\",le=\"+Inf\"} 4
request_seconds_sum{route=\"/api\"} 1.25
request_seconds_count{route=\"/api\"} 4
"
        );
    }

    #[test]
    fn test_encode_omits_empty_help() {
        let families = vec![
            MetricFamily::new("up", "", MetricType::Gauge).with_sample(Sample::new(1.0)),
        ];
        assert_eq!(encode(&families), "# TYPE up gauge\nup 1\n");
    }

    #[test]
    fn test_encode_escapes_and_timestamp() {
        let mut sample = Sample::new(2.0).with_label("path", "a\"b\\c\nd");
        sample.timestamp_ms = Some(1_700_000_000_000);
        let families = vec![MetricFamily::new("x", "line\nbreak", MetricType::Untyped).with_sample(sample)];

        assert_eq!(
            encode(&families),
            "# HELP x line\\nbreak\n# TYPE x untyped\nx{path=\"a\\\"b\\\\c\\nd\"} 2 1700000000000\n"
        );
    }

    #[test]
    fn test_encode_skips_nameless_family() {
        let families = vec![MetricFamily::default()];
        assert_eq!(encode(&families), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NAN), "NaN");
    }
}
