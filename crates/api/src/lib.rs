//! Data API Server
//!
//! REST API exposing CRUD operations over data records.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use data_service::{DataService, SqliteDataService};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use storage::{Database, SqliteDataRepository};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod rate_limit;
mod routes;
mod settings;

pub use error::{error_body, ApiError};
pub use rate_limit::{create_governor_config, RateLimitConfig};
pub use settings::{LoggingConfig, PaginationConfig, ServerConfig, Settings, SettingsError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Business operations on data records
    pub service: Arc<dyn DataService>,
    /// Paging limits
    pub pagination: PaginationConfig,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(service: Arc<dyn DataService>, pagination: PaginationConfig) -> Self {
        Self {
            service,
            pagination,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Serve `/metrics` from this handle
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create the application router
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/data", get(routes::data::list).post(routes::data::create))
        .route(
            "/data/:id",
            get(routes::data::get_one)
                .put(routes::data::update)
                .delete(routes::data::delete),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(server.request_timeout())),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = config.level.parse().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server until Ctrl-C, then drain the repository
pub async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let db = Database::connect(&settings.database).await?;
    let shutdown = CancellationToken::new();
    let repository = SqliteDataRepository::new(db, shutdown.clone()).await?;
    let service: Arc<dyn DataService> = Arc::new(SqliteDataService::new(repository.clone()));

    let state = AppState::new(service, settings.pagination.clone()).with_metrics(metrics);
    let mut app = create_router(state, &settings.server);

    if settings.rate_limit.enabled {
        match create_governor_config(&settings.rate_limit) {
            Some(config) => app = app.layer(GovernorLayer { config }),
            None => warn!("Rate limit quota is zero, limiter disabled"),
        }
    }

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // No requests are in flight any more, so teardown cannot race a query.
    shutdown.cancel();
    repository.close().await;
    info!("Server stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use data_service::mock::MockDataServiceSuccessful;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MockDataServiceSuccessful::default()),
            PaginationConfig::default(),
        );
        create_router(state, &ServerConfig::default())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let response = app()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
