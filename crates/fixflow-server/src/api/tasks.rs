use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use fixflow_core::models::task::TaskView;
use fixflow_core::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{task_id}", get(get_task))
}

/// Unknown ids are reported as `not_found` with status 200.
async fn get_task(State(state): State<AppState>, Path(task_id): Path<String>) -> Json<TaskView> {
    Json(state.tasks.status(&task_id))
}
