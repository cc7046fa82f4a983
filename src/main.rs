//! HYBRIDVFL Dashboard Server
//!
//! Streams a simulated federated-learning run to connected dashboards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   HYBRIDVFL DASHBOARD                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │ WebSocket │  │ Command   │  │  Training Simulator     │ │
//! │  │ Observers │─▶│ Handlers  │  │  (ticker task)          │ │
//! │  │  (Axum)   │  │           │  │                         │ │
//! │  └─────▲─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        │              ▼                     ▼               │
//! │  ┌─────┴─────┐  ┌─────────────────────────────────────┐    │
//! │  │ Event Hub │◀─│           Session Store             │    │
//! │  └───────────┘  └─────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod constants;
mod error;
mod handlers;
mod logic;
mod models;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

pub use error::{AppError, AppResult};

use config::{Config, LogFormat};
use logic::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config);

    config.validate().map_err(AppError::from)?;

    tracing::info!("{} v{} starting...", constants::APP_NAME, constants::APP_VERSION);
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Tick interval: {}s", config.tick_interval_secs);

    // Build application state
    let dashboard = Arc::new(Dashboard::new(config.tick_interval(), config.rng_seed));
    let state = AppState {
        dashboard: Arc::clone(&dashboard),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(AppError::from)?;
    tracing::info!("🚀 Dashboard listening on http://{}", addr);

    let on_shutdown = Arc::clone(&dashboard);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutting down dashboard...");
            on_shutdown.shutdown().await;
        })
        .await
        .map_err(AppError::from)?;

    // The signal path already ran this; covers the server exiting on its own.
    dashboard.shutdown().await;
    tracing::info!("Dashboard stopped");
    Ok(())
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_production() {
        "hybridvfl_dashboard=info,tower_http=info"
    } else {
        "hybridvfl_dashboard=debug,tower_http=debug"
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()),
    );

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub config: Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/state", get(handlers::state::snapshot))
        .route("/ws", get(handlers::ws::upgrade))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            dashboard: Arc::new(Dashboard::new(Duration::from_secs(5), Some(1))),
            config: Config::default(),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = get_json(create_router(test_state()), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["training_active"], false);
        assert_eq!(body["observers"], 0);
    }

    #[tokio::test]
    async fn test_state_route_matches_snapshot() {
        let state = test_state();
        state.dashboard.switch_tab(models::SwitchTabRequest { tab: "attack".to_string() });

        let (status, body) = get_json(create_router(state), "/api/v1/state").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_tab"], "attack");
        assert_eq!(body["config"]["dataset"], "HAM10K");
        assert_eq!(body["config"]["federated_rounds"], 2);
        assert_eq!(body["metrics"]["home"]["timer"], "00:00:00");
        assert_eq!(body["training_active"], false);
    }
}
