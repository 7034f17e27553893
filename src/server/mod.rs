pub mod trigger;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ConfigError};

/// Shared handler state; the configuration is validated once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Result<Arc<AppConfig>, ConfigError>,
}

impl AppState {
    pub fn new(config: Result<AppConfig, ConfigError>) -> Self {
        Self {
            config: config.map(Arc::new),
        }
    }
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/energy-prices",
            get(trigger::energy_prices_handler).post(trigger::energy_prices_handler),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP trigger
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET|POST /api/energy-prices");
    tracing::info!("  GET /health");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, router(state)).await
}
