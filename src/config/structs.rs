use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bridge::BridgeConfig;
use crate::errors::Result;
use crate::metrics::prefix::{DEFAULT_PRIMARY_PREFIX, DEFAULT_RUNTIME_PREFIX, ReservedPrefixes};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "promgate.toml";

/// Environment variable prefix; nested keys use `__`, e.g. `PG__GRAPHITE__ADDRESS`
pub const ENV_PREFIX: &str = "PG";

/// Application configuration
///
/// Priority: ENV > config file > defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub graphite: GraphiteConfig,
    #[serde(default)]
    pub features: FeatureToggles,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from `path` (or the default file, if present) and the environment.
    ///
    /// An explicitly given file must exist; the default one is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    pub(crate) fn load_with_env(
        path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        use config::{Config, Environment, File};

        let (file, required) = match path {
            Some(p) => (p, true),
            None => (DEFAULT_CONFIG_PATH, false),
        };

        let settings = Config::builder()
            .add_source(File::with_name(file).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("graphite.allow")
                    .with_list_parse_key("graphite.deny")
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize::<AppConfig>()?)
    }

    /// Default configuration rendered as TOML
    pub fn sample_toml() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("# Error generating sample config: {}", e))
    }

    pub fn reserved_prefixes(&self) -> ReservedPrefixes {
        ReservedPrefixes::new(
            self.metrics.primary_prefix.clone(),
            [self.metrics.runtime_prefix.clone()],
        )
    }

    /// Bridge settings, or `None` when no Graphite address is configured.
    ///
    /// The result is not validated here; `Bridge::new` does that.
    pub fn bridge_config(&self) -> Option<BridgeConfig> {
        let graphite = &self.graphite;
        if graphite.address.trim().is_empty() {
            return None;
        }

        Some(BridgeConfig {
            address: graphite.address.trim().to_string(),
            prefix: graphite.prefix.clone(),
            interval: Duration::from_secs(self.metrics.interval_seconds),
            timeout: Duration::from_secs(graphite.timeout_seconds),
            allow: graphite.allow.clone(),
            deny: graphite.deny.clone(),
            max_logged_failures: graphite.max_logged_failures,
        })
    }
}

/// Gathering and naming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default = "default_primary_prefix")]
    pub primary_prefix: String,
    #[serde(default = "default_runtime_prefix")]
    pub runtime_prefix: String,
    /// Push interval, also used for process metrics refresh
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_process_metrics")]
    pub process_metrics: bool,
}

/// Graphite bridge; an empty address disables it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphiteConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default = "default_graphite_prefix")]
    pub prefix: String,
    #[serde(default = "default_graphite_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default = "default_max_logged_failures")]
    pub max_logged_failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureToggles {
    /// Serve the shared registry through the prefixing gatherer instead of
    /// the process default registry
    #[serde(default)]
    pub unified_registry: bool,
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_primary_prefix() -> String {
    DEFAULT_PRIMARY_PREFIX.to_string()
}

fn default_runtime_prefix() -> String {
    DEFAULT_RUNTIME_PREFIX.to_string()
}

fn default_interval_seconds() -> u64 {
    10
}

fn default_process_metrics() -> bool {
    true
}

fn default_graphite_prefix() -> String {
    "prod.grafana.".to_string()
}

fn default_graphite_timeout() -> u64 {
    15
}

fn default_max_logged_failures() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            primary_prefix: default_primary_prefix(),
            runtime_prefix: default_runtime_prefix(),
            interval_seconds: default_interval_seconds(),
            process_metrics: default_process_metrics(),
        }
    }
}

impl Default for GraphiteConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            prefix: default_graphite_prefix(),
            timeout_seconds: default_graphite_timeout(),
            allow: Vec::new(),
            deny: Vec::new(),
            max_logged_failures: default_max_logged_failures(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
