use std::sync::{Arc, OnceLock};

use super::AppConfig;
use crate::errors::Result;

static CONFIG: OnceLock<Arc<AppConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Falls back to defaults if `init_config` was never called.
pub fn get_config() -> Arc<AppConfig> {
    CONFIG
        .get_or_init(|| Arc::new(AppConfig::default()))
        .clone()
}

/// Load the configuration and install it globally
///
/// Only the first successful call takes effect; later calls return the
/// already-installed instance.
pub fn init_config(path: Option<&str>) -> Result<Arc<AppConfig>> {
    if let Some(config) = CONFIG.get() {
        return Ok(config.clone());
    }
    let loaded = Arc::new(AppConfig::load(path)?);
    Ok(CONFIG.get_or_init(|| loaded).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_installs_global_instance() {
        let installed = init_config(None).unwrap();
        assert!(Arc::ptr_eq(&installed, &get_config()));
        assert!(Arc::ptr_eq(&installed, &init_config(None).unwrap()));
    }
}
