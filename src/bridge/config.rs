use std::time::Duration;

use crate::errors::{MetricsError, Result};

/// Settings for one Graphite bridge. Read-only once the bridge is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// `host:port` of the Graphite plaintext listener
    pub address: String,
    /// Prepended verbatim to every metric path, e.g. `prod.grafana.`
    pub prefix: String,
    pub interval: Duration,
    /// Bound on connecting and on writing one payload
    pub timeout: Duration,
    /// Family-name prefixes to push; empty means everything
    pub allow: Vec<String>,
    /// Family-name prefixes never pushed, checked after `allow`
    pub deny: Vec<String>,
    /// Consecutive delivery failures logged at warn level before the rest
    /// drop to debug. All failures are counted regardless.
    pub max_logged_failures: u32,
}

impl BridgeConfig {
    pub fn new(address: impl Into<String>, interval: Duration) -> Self {
        Self {
            address: address.into(),
            prefix: String::new(),
            interval,
            timeout: Duration::from_secs(15),
            allow: Vec::new(),
            deny: Vec::new(),
            max_logged_failures: 10,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (host, port) = self.address.rsplit_once(':').ok_or_else(|| {
            MetricsError::bridge_config(format!(
                "graphite address '{}' must be host:port",
                self.address
            ))
        })?;
        if host.is_empty() {
            return Err(MetricsError::bridge_config(format!(
                "graphite address '{}' has no host",
                self.address
            )));
        }
        port.parse::<u16>().map_err(|e| {
            MetricsError::bridge_config(format!(
                "graphite address '{}' has invalid port: {}",
                self.address, e
            ))
        })?;

        if self.interval.is_zero() {
            return Err(MetricsError::bridge_config("push interval must be positive"));
        }
        if self.timeout.is_zero() {
            return Err(MetricsError::bridge_config("push timeout must be positive"));
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(MetricsError::bridge_config(format!(
                "graphite prefix '{}' contains whitespace",
                self.prefix
            )));
        }
        if self.allow.iter().chain(&self.deny).any(|p| p.is_empty()) {
            return Err(MetricsError::bridge_config(
                "allow/deny entries must not be empty",
            ));
        }

        Ok(())
    }

    /// Whether a family named `name` should be pushed.
    pub fn accepts(&self, name: &str) -> bool {
        let allowed = self.allow.is_empty() || self.allow.iter().any(|p| name.starts_with(p.as_str()));
        allowed && !self.deny.iter().any(|p| name.starts_with(p.as_str()))
    }
}
