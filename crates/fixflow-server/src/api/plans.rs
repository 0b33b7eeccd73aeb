use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use fixflow_core::error::ServerError;
use fixflow_core::models::task::TaskView;
use fixflow_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{plan_id}/approve", post(approve_plan))
        .route("/{plan_id}/reject", post(reject_plan))
}

/// Conflicts and unknown ids come back as 200 with a `detail` message.
async fn approve_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<TaskView>, ServerError> {
    tracing::info!("[API] approve {}", plan_id);
    state.tasks.approve(&plan_id).await.map(Json)
}

async fn reject_plan(State(state): State<AppState>, Path(plan_id): Path<String>) -> Json<TaskView> {
    tracing::info!("[API] reject {}", plan_id);
    Json(state.tasks.reject(&plan_id).await)
}
