use std::fmt;

use crate::runtime::shutdown::ShutdownReason;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    UpstreamGather(String),
    DuplicateMetricName(String),
    UnnamedMetricFamily(usize),
    BridgeConfig(String),
    BridgeDelivery(String),
    Registration(String),
    Config(String),
    Cancelled(ShutdownReason),
    AlreadyRunning,
}

impl MetricsError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            MetricsError::UpstreamGather(_) => "M001",
            MetricsError::DuplicateMetricName(_) => "M002",
            MetricsError::UnnamedMetricFamily(_) => "M003",
            MetricsError::BridgeConfig(_) => "M004",
            MetricsError::BridgeDelivery(_) => "M005",
            MetricsError::Registration(_) => "M006",
            MetricsError::Config(_) => "M007",
            MetricsError::Cancelled(_) => "M008",
            MetricsError::AlreadyRunning => "M009",
        }
    }

    /// Human readable error type
    pub fn error_type(&self) -> &'static str {
        match self {
            MetricsError::UpstreamGather(_) => "Upstream Gather Error",
            MetricsError::DuplicateMetricName(_) => "Duplicate Metric Name",
            MetricsError::UnnamedMetricFamily(_) => "Unnamed Metric Family",
            MetricsError::BridgeConfig(_) => "Bridge Configuration Error",
            MetricsError::BridgeDelivery(_) => "Bridge Delivery Error",
            MetricsError::Registration(_) => "Collector Registration Error",
            MetricsError::Config(_) => "Configuration Error",
            MetricsError::Cancelled(_) => "Cancelled",
            MetricsError::AlreadyRunning => "Service Already Running",
        }
    }

    pub fn message(&self) -> String {
        match self {
            MetricsError::UpstreamGather(msg)
            | MetricsError::BridgeConfig(msg)
            | MetricsError::BridgeDelivery(msg)
            | MetricsError::Registration(msg)
            | MetricsError::Config(msg) => msg.clone(),
            MetricsError::DuplicateMetricName(name) => {
                format!("duplicate metric name: {}", name)
            }
            MetricsError::UnnamedMetricFamily(index) => {
                format!("metric family at position {} has no name", index)
            }
            MetricsError::Cancelled(reason) => reason.to_string(),
            MetricsError::AlreadyRunning => "run() may only be called once".to_string(),
        }
    }

    /// Colored output for terminal use
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for MetricsError {}

impl MetricsError {
    pub fn upstream_gather<T: Into<String>>(msg: T) -> Self {
        MetricsError::UpstreamGather(msg.into())
    }

    pub fn duplicate_metric_name<T: Into<String>>(name: T) -> Self {
        MetricsError::DuplicateMetricName(name.into())
    }

    pub fn bridge_config<T: Into<String>>(msg: T) -> Self {
        MetricsError::BridgeConfig(msg.into())
    }

    pub fn bridge_delivery<T: Into<String>>(msg: T) -> Self {
        MetricsError::BridgeDelivery(msg.into())
    }

    pub fn registration<T: Into<String>>(msg: T) -> Self {
        MetricsError::Registration(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        MetricsError::Config(msg.into())
    }
}

impl From<prometheus::Error> for MetricsError {
    fn from(err: prometheus::Error) -> Self {
        MetricsError::Registration(err.to_string())
    }
}

impl From<config::ConfigError> for MetricsError {
    fn from(err: config::ConfigError) -> Self {
        MetricsError::Config(err.to_string())
    }
}

impl From<std::io::Error> for MetricsError {
    fn from(err: std::io::Error) -> Self {
        MetricsError::BridgeDelivery(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
