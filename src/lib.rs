pub mod config;
pub mod logging;
pub mod modules;
pub mod services;

use axum::{middleware, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{Config, ServiceRole};
use modules::catalog::catalog_routes;
use modules::metrics::metrics_routes;
use services::metrics::{
    metrics_middleware, BusinessMetricsCollector, HttpMetricsCollector, MetricsError,
    MetricsRegistry, PeriodicSampler, SamplerHandle,
};
use services::simulation::{ActiveUsersSource, Simulation};

pub struct AppState {
    pub config: Config,
    pub metrics: Arc<MetricsRegistry>,
    pub http_metrics: HttpMetricsCollector,
    pub business_metrics: BusinessMetricsCollector,
    pub simulation: Arc<Simulation>,
}

impl AppState {
    /// Registers the HTTP and business metrics on `metrics`; fails if any of
    /// their names is already taken.
    pub fn new(config: Config, metrics: Arc<MetricsRegistry>) -> Result<Arc<Self>, MetricsError> {
        let http_metrics = HttpMetricsCollector::register(&metrics)?;
        let business_metrics = BusinessMetricsCollector::register(&metrics)?;
        let simulation = Arc::new(Simulation::new(config.simulation.clone()));

        Ok(Arc::new(Self {
            config,
            metrics,
            http_metrics,
            business_metrics,
            simulation,
        }))
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(metrics_routes())
        .nest("/api", catalog_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), metrics_middleware))
                .layer(CatchPanicLayer::new())
                .layer(RequestBodyLimitLayer::new(1024 * 100)), // 100KB max body
        )
        .with_state(state)
}

/// Start the periodic samplers for this service's role
pub fn spawn_samplers(state: &AppState) -> Vec<SamplerHandle> {
    match state.config.role {
        ServiceRole::User => {
            let sampler = PeriodicSampler::new(
                "active_users",
                state.business_metrics.active_users_gauge(),
                ActiveUsersSource::new(state.simulation.clone()),
                state.config.sampler_interval,
            );
            vec![sampler.spawn()]
        }
        ServiceRole::Order | ServiceRole::Generic => Vec::new(),
    }
}
