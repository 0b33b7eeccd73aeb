//! `fixflow run`: Execute a single request and print the task payload.

use fixflow_core::models::task::TaskView;
use fixflow_core::service::ExecuteRequest;
use fixflow_core::state::AppState;

use super::print_json;

pub async fn run(state: &AppState, request: &str, require_approval: bool) -> Result<(), String> {
    let view = execute(state, request, require_approval).await?;
    let value = serde_json::to_value(&view).map_err(|e| e.to_string())?;
    print_json(&value);
    Ok(())
}

pub async fn execute(
    state: &AppState,
    request: &str,
    require_approval: bool,
) -> Result<TaskView, String> {
    state
        .tasks
        .execute(ExecuteRequest {
            request: request.to_string(),
            require_approval,
        })
        .await
        .map_err(|e| e.to_string())
}
