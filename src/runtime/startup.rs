//! Registerer / gatherer selection and service assembly
//!
//! With `features.unified_registry` on, collectors go to a shared registry
//! that embedded subsystems also register into without a common naming
//! convention, and scrapes read it through the prefixing gatherer. With the
//! toggle off, the process default registry is used as is.

use std::sync::Arc;

use once_cell::sync::Lazy;
use prometheus::Registry;
use tracing::{debug, info};

use super::service::MetricsService;
use crate::config::{AppConfig, FeatureToggles};
use crate::errors::Result;
use crate::metrics::gatherer::Gatherer;
use crate::metrics::prefix::{PrefixingGatherer, ReservedPrefixes};

static SHARED_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Registry shared with embedded subsystems
pub fn shared_registry() -> &'static Registry {
    &SHARED_REGISTRY
}

pub fn provide_registerer(features: &FeatureToggles) -> Registry {
    if features.unified_registry {
        shared_registry().clone()
    } else {
        prometheus::default_registry().clone()
    }
}

pub fn provide_gatherer(features: &FeatureToggles, prefixes: ReservedPrefixes) -> Arc<dyn Gatherer> {
    if features.unified_registry {
        Arc::new(PrefixingGatherer::new(shared_registry().clone(), prefixes))
    } else {
        Arc::new(prometheus::default_registry().clone())
    }
}

/// Fresh, isolated registry
pub fn provide_registerer_for_test() -> Registry {
    Registry::new()
}

/// The registry handed out by [`provide_registerer_for_test`], as a gatherer
pub fn provide_gatherer_for_test(registerer: &Registry) -> Arc<dyn Gatherer> {
    Arc::new(registerer.clone())
}

pub struct StartupContext {
    pub registerer: Registry,
    pub gatherer: Arc<dyn Gatherer>,
    pub service: MetricsService,
}

/// Pick the registerer/gatherer pair and build the service on them.
///
/// Fails if the built-in collectors cannot be registered.
pub fn prepare_metrics(config: &AppConfig) -> Result<StartupContext> {
    let registerer = provide_registerer(&config.features);
    let gatherer = provide_gatherer(&config.features, config.reserved_prefixes());
    debug!(
        unified_registry = config.features.unified_registry,
        "Selected metrics registry"
    );

    let service = MetricsService::new(config, &registerer, gatherer.clone())?;
    match service.bridge_config() {
        Some(bridge) => info!(address = %bridge.address, "Graphite bridge configured"),
        None => info!("Graphite bridge is disabled (graphite.address not set)"),
    }

    Ok(StartupContext {
        registerer,
        gatherer,
        service,
    })
}
