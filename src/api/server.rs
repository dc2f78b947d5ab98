//! Plantops API Server implementation
//!
//! HTTP JSON API using Axum. Sheet reads and writes go through the configured
//! spreadsheet endpoint; assistant routes need a Gemini key.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::assistant::Assistant;
use crate::client::PlantClient;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub client: PlantClient,
    /// `None` when no API key was configured
    pub assistant: Option<Assistant>,
}

impl AppState {
    pub fn new(client: PlantClient, assistant: Option<Assistant>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            client,
            assistant,
        }
    }
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route(
            "/api/v1/sheets/:sheet",
            get(handlers::list_sheet).post(handlers::create_row),
        )
        .route("/api/v1/sheets/:sheet/headers", get(handlers::sheet_headers))
        .route("/api/v1/dashboard", get(handlers::dashboard))
        .route("/api/v1/kpis", get(handlers::kpis))
        .route("/api/v1/order-form", get(handlers::order_form))
        .route("/api/v1/orders/:no_ot", get(handlers::order_detail))
        .route("/api/v1/orders/:no_ot/priority", post(handlers::suggest_priority))
        .route("/api/v1/orders/:no_ot/email", post(handlers::draft_email))
        .route("/api/v1/products/search", get(handlers::search_products))
        .route("/api/v1/products/:codigo", put(handlers::update_product))
        .route(
            "/api/v1/staff/job-description",
            post(handlers::job_description),
        )
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🏭 Plantops API Server starting on http://{}", addr);
    info!("   Sheets: /api/v1/sheets/{{sheet}}, KPIs: /api/v1/kpis");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Plantops API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, stopping server...");
}
