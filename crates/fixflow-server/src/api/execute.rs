use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use fixflow_core::error::ServerError;
use fixflow_core::models::task::TaskView;
use fixflow_core::service::ExecuteRequest;
use fixflow_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(execute))
}

/// Plan a request and either run it or hold it for approval.
async fn execute(
    State(state): State<AppState>,
    body: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<TaskView>, ServerError> {
    let Json(body) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    tracing::info!(
        "[API] execute (require_approval={}): {}",
        body.require_approval,
        body.request
    );
    state.tasks.execute(body).await.map(Json)
}
