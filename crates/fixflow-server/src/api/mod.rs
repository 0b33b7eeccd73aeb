pub mod execute;
pub mod plans;
pub mod tasks;

use axum::Router;

use fixflow_core::state::AppState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/execute", execute::router())
        .nest("/api/v1/plans", plans::router())
        .nest("/api/v1/tasks", tasks::router())
}
