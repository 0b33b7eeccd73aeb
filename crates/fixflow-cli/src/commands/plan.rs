//! `fixflow plan`: Show which steps the planner picks, without running them.

use fixflow_core::state::AppState;
use fixflow_core::workflow::Plan;

use super::print_json;

pub async fn run(state: &AppState, request: &str) -> Result<(), String> {
    print_json(&preview(state, request).await);
    Ok(())
}

/// The plan as stored for approval, and as the direct workflow runs it.
pub async fn preview(state: &AppState, request: &str) -> serde_json::Value {
    let plan: Plan = state.tasks.preview_plan(request).await;
    let steps = plan.names();
    let workflow_steps = plan.with_email().names();
    serde_json::json!({
        "request": request,
        "steps": steps,
        "workflow_steps": workflow_steps,
    })
}
