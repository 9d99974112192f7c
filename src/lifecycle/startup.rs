//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the controller registry from configuration
//! - Load and compile the route specification
//! - Load view templates
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The router is fully compiled before a listener is bound

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::compiler::{CompileError, SpecificationCompiler};
use crate::config::{AppConfig, ConfigError, ObservabilityConfig};
use crate::controller::{Controller, MemoryResource, Registry};
use crate::observability::metrics;
use crate::routing::{labeled_handler, Flow, Handler, Router};
use crate::spec::{load_file, SpecLoadError, SpecMap, SpecNode};
use crate::views::{NoViews, TemplateViews, ViewEngine, ViewError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Spec(#[from] SpecLoadError),

    #[error("route compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Views(#[from] ViewError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] std::net::AddrParseError),

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Install the Prometheus exporter when metrics are enabled.
///
/// Returns whether an exporter was installed.
pub fn start_metrics(config: &ObservabilityConfig) -> Result<bool, StartupError> {
    if !config.metrics_enabled {
        return Ok(false);
    }
    metrics::init_metrics(config.metrics_address.parse()?)?;
    Ok(true)
}

/// Everything the server needs, built from a validated configuration.
pub struct Application {
    pub config: AppConfig,
    pub router: Arc<Router>,
    pub views: Arc<dyn ViewEngine>,
    pub bindings: usize,
}

/// Logs each request passing through; referenced as `trace` in specifications.
pub fn trace_middleware() -> Handler {
    labeled_handler("trace", |ctx| {
        tracing::debug!(
            request_id = ctx.request_id().unwrap_or("unknown"),
            method = %ctx.method(),
            path = %ctx.original_path(),
            "Request"
        );
        Flow::Next
    })
}

/// Registry with one `MemoryResource` per configured resource and the built-in middleware.
pub fn build_registry(config: &AppConfig) -> Registry {
    let mut registry = Registry::new().with_middleware("trace", trace_middleware());

    for resource in &config.resources {
        let store = resource
            .required
            .iter()
            .fold(MemoryResource::new(resource.id.as_str()), |store, field| store.require(field.as_str()));
        registry.insert_controller(resource.controller.as_str(), Controller::resource(Arc::new(store)));
        tracing::debug!(controller = %resource.controller, id = %resource.id, "Resource controller registered");
    }
    registry
}

/// The configured specification, or an empty one when none is configured.
pub fn load_spec(config: &AppConfig) -> Result<SpecNode, StartupError> {
    match &config.routes.spec_path {
        Some(path) => Ok(load_file(Path::new(path))?),
        None => {
            tracing::warn!("No route specification configured; every request will be unmatched");
            Ok(SpecNode::Map(SpecMap::new()))
        }
    }
}

/// Templates from the configured directory, or none.
pub fn load_views(config: &AppConfig) -> Result<Arc<dyn ViewEngine>, StartupError> {
    match &config.views.directory {
        Some(dir) => {
            let views = TemplateViews::from_directory(Path::new(dir), &config.views.extension)?;
            Ok(Arc::new(views))
        }
        None => Ok(Arc::new(NoViews)),
    }
}

/// Build the registry, compile the specification and load views.
pub fn prepare(config: AppConfig) -> Result<Application, StartupError> {
    let registry = build_registry(&config);
    let spec = load_spec(&config)?;

    let mut router = Router::new();
    let bindings = SpecificationCompiler::new(&registry).compile_into(&spec, &config.routes.base_path, &mut router)?;
    metrics::record_compiled_bindings(bindings);

    let views = load_views(&config)?;

    Ok(Application {
        config,
        router: Arc::new(router),
        views,
        bindings,
    })
}
