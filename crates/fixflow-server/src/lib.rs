//! fixflow Server - HTTP front end for the IT-support task orchestrator
//!
//! Exposes the task service from `fixflow-core` as a small JSON API:
//! - `POST /api/v1/execute`: plan and run a request, or hold it for approval
//! - `POST /api/v1/plans/{id}/approve` / `reject`: resolve a held plan
//! - `GET /api/v1/tasks/{id}`: look up any task
//!
//! The domain logic lives in `fixflow-core`; this crate only does routing.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fixflow_core::config::AppConfig;
use fixflow_core::state::{AppState, AppStateInner};

/// Configuration for the HTTP listener.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3210,
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }
}

/// Create a shared `AppState` backed by the configured model provider.
pub fn create_app_state(config: &AppConfig) -> Result<AppState, String> {
    let inner = AppStateInner::from_config(config)
        .map_err(|e| format!("Failed to initialize task service: {}", e))?;
    Ok(Arc::new(inner))
}

/// Initialize the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fixflow_core=info,fixflow_server=info,tower_http=info".into()
            }),
        )
        .try_init();
}

/// Start the server from a loaded application config.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: &AppConfig) -> Result<SocketAddr, String> {
    init_tracing();

    let server = ServerConfig::from(config);
    tracing::info!(
        "Starting fixflow server on {}:{} (model: {})",
        server.host,
        server.port,
        config.model.model
    );

    let state = create_app_state(config)?;
    start_server_with_state(server, state).await
}

/// Build the full router around a pre-built state.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/api/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server with a pre-built `AppState`.
///
/// Tests use this with scripted models and port 0.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("fixflow server listening on {}", local_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let counts = state.tasks.registry().counts();
    axum::Json(serde_json::json!({
        "status": "ok",
        "server": "fixflow-server",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model_name,
        "tasks": counts,
    }))
}
