//! In-memory representation of one gather cycle
//!
//! A snapshot is an ordered `Vec<MetricFamily>`. It is produced fresh on
//! every gather call and handed to the caller, so holders may mutate it
//! freely without affecting the gatherer that produced it.

use std::fmt;

/// Metric family type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    #[default]
    Untyped,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
            Self::Summary => "summary",
            Self::Untyped => "untyped",
        }
    }

    /// Series suffixes a family of this type may emit besides the bare name.
    pub fn series_suffixes(&self) -> &'static [&'static str] {
        match self {
            Self::Histogram => &["_bucket", "_sum", "_count"],
            Self::Summary => &["_sum", "_count"],
            _ => &[],
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<prometheus::proto::MetricType> for MetricType {
    fn from(kind: prometheus::proto::MetricType) -> Self {
        use prometheus::proto::MetricType as Proto;
        match kind {
            Proto::COUNTER => Self::Counter,
            Proto::GAUGE => Self::Gauge,
            Proto::HISTOGRAM => Self::Histogram,
            Proto::SUMMARY => Self::Summary,
            Proto::UNTYPED => Self::Untyped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPair {
    pub name: String,
    pub value: String,
}

impl LabelPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One series value inside a family.
///
/// `suffix` is appended to the family name to form the series name, so a
/// rename of the family carries over to all of its series.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub suffix: String,
    pub labels: Vec<LabelPair>,
    pub value: f64,
    pub timestamp_ms: Option<i64>,
}

impl Sample {
    pub fn new(value: f64) -> Self {
        Self {
            suffix: String::new(),
            labels: Vec::new(),
            value,
            timestamp_ms: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(LabelPair::new(name, value));
        self
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricFamily {
    /// `None` only for malformed upstream output
    pub name: Option<String>,
    pub help: String,
    pub kind: MetricType,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(name: impl Into<String>, help: impl Into<String>, kind: MetricType) -> Self {
        Self {
            name: Some(name.into()),
            help: help.into(),
            kind,
            samples: Vec::new(),
        }
    }

    pub fn with_sample(mut self, sample: Sample) -> Self {
        self.samples.push(sample);
        self
    }

    /// The family name, treating an empty string like a missing one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Full series name for `sample`, e.g. `http_duration_seconds_bucket`.
    pub fn series_name(&self, sample: &Sample) -> String {
        format!("{}{}", self.name().unwrap_or_default(), sample.suffix)
    }
}

/// Names of a snapshot, in order. Nameless families are skipped.
pub fn family_names(snapshot: &[MetricFamily]) -> Vec<&str> {
    snapshot.iter().filter_map(MetricFamily::name).collect()
}
