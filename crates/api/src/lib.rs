//! Temperature Monitoring API Server
//!
//! REST API for registering locations and thermometers, recording readings
//! and querying latest values and aggregate statistics.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
mod routes;

pub use crate::config::{LogFormat, Settings};
pub use error::ApiError;

use storage::Repository;

/// Application state shared across handlers
pub struct AppState {
    /// Storage repository
    pub repository: Repository,
    /// Prometheus handle, absent when no recorder was installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: Repository, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            repository,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/init-demo-data", post(routes::demo::init_demo_data))
        .route(
            "/locations",
            get(routes::locations::list_locations).post(routes::locations::create_location),
        )
        .route("/locations/:location_id", get(routes::locations::get_location))
        .route(
            "/thermometers",
            get(routes::thermometers::list_thermometers)
                .post(routes::thermometers::create_thermometer),
        )
        .route(
            "/thermometers/:thermometer_id",
            get(routes::thermometers::get_thermometer),
        )
        .route("/readings", post(routes::readings::add_reading))
        .route("/readings/", post(routes::readings::add_reading))
        .route("/readings/latest", get(routes::readings::latest_readings))
        .route(
            "/readings/:thermometer_id",
            get(routes::readings::list_readings),
        )
        .route(
            "/stats/thermometer/:thermometer_id",
            get(routes::stats::thermometer_stats),
        )
        .route("/stats/location/:location_id", get(routes::stats::location_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, database) = match state.repository.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let response = HealthResponse {
        status: (if status.is_success() { "healthy" } else { "degraded" }).to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database: database.to_string(),
    };

    (status, Json(response))
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_logging(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
}

/// Run the server until Ctrl-C
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let pool = storage::connect(&settings.database_url, settings.max_connections).await?;
    storage::run_migrations(&pool).await?;

    let metrics = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(Repository::new(pool), Some(metrics)));
    let app = create_router(state);

    info!("Starting API server on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
