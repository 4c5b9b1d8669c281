pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, routing::get, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::environment::Config;
use config::DbPool;
use modules::metrics::metrics_routes;
use modules::snapshot::crud::SnapshotCrud;
use modules::snapshot::snapshot_routes;
use modules::target::crud::TargetCrud;
use modules::target::target_routes;
use services::blob::{BlobStore, FsBlobStore};
use services::checker::CheckRunner;
use services::dispatcher::AlertDispatcher;
use services::events::EventBus;
use services::fetch::HttpFetchGateway;
use services::metrics::{metrics_middleware, MetricsRegistry};
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::scheduler::Scheduler;
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub scheduler: Arc<Scheduler>,
    pub metrics: Arc<MetricsRegistry>,
    pub events: EventBus,
}

pub async fn create_app(db: DbPool, config: &Config) -> (Router, Arc<AppState>) {
    let metrics = MetricsRegistry::new().expect("Failed to build metrics registry");
    let events = EventBus::default();

    let gateway = Arc::new(HttpFetchGateway::new(
        Duration::from_secs(config.fetch_timeout_secs),
        config.renderer_url.clone(),
    ));
    let targets = Arc::new(TargetCrud::new(db.clone()));
    let snapshots = Arc::new(SnapshotCrud::new(db.clone()));
    let blobs = config
        .blob_dir
        .as_ref()
        .map(|dir| Arc::new(FsBlobStore::new(dir)) as Arc<dyn BlobStore>);
    let dispatcher = AlertDispatcher::new(
        Duration::from_secs(config.fetch_timeout_secs),
        config.webhook_secret.clone(),
    );

    let runner = Arc::new(CheckRunner::new(
        gateway,
        targets.clone(),
        snapshots,
        blobs,
        dispatcher,
        events.clone(),
        metrics.clone(),
    ));
    let scheduler = Arc::new(Scheduler::new(targets, runner));

    let state = Arc::new(AppState {
        db,
        scheduler,
        metrics: metrics.clone(),
        events,
    });

    // Rate limit: 5/s steady with a burst of 20
    let rate_limiter = create_rate_limiter(5, 20);

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route(
            "/checks/run",
            post(modules::target::controller::run_scheduled_checks),
        )
        .nest("/targets", target_routes())
        .nest("/snapshots", snapshot_routes())
        .merge(metrics_routes())
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (router, state)
}

async fn root() -> &'static str {
    "Site Watch API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
