//! Task service: the transport-agnostic API boundary.
//!
//! HTTP handlers and CLI commands both go through [`TaskService`]; it decides
//! between storing a plan for approval and running the full workflow, and
//! forwards approval decisions to the [`TaskRegistry`].

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Deserialize;

use crate::agents::AgentToolkit;
use crate::error::ServerError;
use crate::llm::CompletionModel;
use crate::models::task::{CompletedTask, PendingTask, TaskOutcome, TaskView};
use crate::store::task_registry::round_seconds;
use crate::store::TaskRegistry;
use crate::workflow::{Plan, PlanExecutor, PlanSummary, Planner, RetryPolicy, TriageWorkflow};

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub request: String,
    #[serde(default)]
    pub require_approval: bool,
}

pub struct TaskService {
    planner: Arc<Planner>,
    workflow: TriageWorkflow,
    executor: PlanExecutor,
    registry: TaskRegistry,
}

impl TaskService {
    pub fn new(planner: Arc<Planner>, agents: AgentToolkit, script_retry: RetryPolicy) -> Self {
        Self {
            workflow: TriageWorkflow::new(planner.clone(), agents.clone())
                .with_script_retry(script_retry),
            executor: PlanExecutor::new(agents),
            registry: TaskRegistry::new(),
            planner,
        }
    }

    /// Planner and every agent share one model.
    pub fn from_model(model: Arc<dyn CompletionModel>, script_retry: RetryPolicy) -> Self {
        Self::new(
            Arc::new(Planner::new(model.clone())),
            AgentToolkit::shared(model),
            script_retry,
        )
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Plan only, without storing anything. Email is not force-appended.
    pub async fn preview_plan(&self, request: &str) -> Plan {
        self.planner.plan(request).await
    }

    pub async fn execute(&self, body: ExecuteRequest) -> Result<TaskView, ServerError> {
        let request = body.request.trim();
        if request.is_empty() {
            return Err(ServerError::BadRequest("request must not be empty".to_string()));
        }

        let created_at = Utc::now();

        if body.require_approval {
            let task_id = format!("plan-{}", uuid::Uuid::new_v4());
            let steps = self.planner.plan(request).await;
            tracing::info!("[TaskService] Stored plan {} with steps {:?}", task_id, steps.names());

            return Ok(self.registry.create(PendingTask {
                task_id,
                original_request: request.to_string(),
                created_at,
                plan: PlanSummary::new(steps),
            }));
        }

        let task_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let state = self.workflow.run(request).await?;
        let duration_seconds = round_seconds(started.elapsed().as_secs_f64());
        tracing::info!("[TaskService] Task {} completed in {}s", task_id, duration_seconds);

        Ok(self.registry.record_completed(CompletedTask {
            task_id,
            original_request: request.to_string(),
            created_at,
            duration_seconds,
            outcome: TaskOutcome::Workflow(state.report()),
        }))
    }

    pub async fn approve(&self, task_id: &str) -> Result<TaskView, ServerError> {
        Ok(self.registry.approve(task_id, &self.executor).await?)
    }

    pub async fn reject(&self, task_id: &str) -> TaskView {
        self.registry.reject(task_id).await
    }

    pub fn status(&self, task_id: &str) -> TaskView {
        self.registry.query(task_id)
    }
}
