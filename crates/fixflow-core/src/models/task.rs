use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflow::{PlanSummary, StepOutcome, WorkflowReport};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[serde(rename = "waiting_approval")]
    Pending,
    Completed,
    Rejected,
    /// Response-only; never stored.
    NotFound,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "waiting_approval",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::NotFound => "not_found",
        }
    }
}

/// A plan waiting for (or denied) approval.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTask {
    pub task_id: String,
    pub original_request: String,
    pub created_at: DateTime<Utc>,
    pub plan: PlanSummary,
}

/// What a completed task produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskOutcome {
    /// Direct run of the full triage workflow.
    Workflow(WorkflowReport),
    /// Approved plan, one entry per executed step.
    Steps { result: Vec<StepOutcome> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTask {
    pub task_id: String,
    pub original_request: String,
    pub created_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub outcome: TaskOutcome,
}

/// Uniform response payload for every task operation, including conflicts
/// and unknown ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanSummary>,
    #[serde(flatten)]
    pub outcome: Option<TaskOutcome>,
}

impl TaskView {
    fn base(task_id: &str, status: TaskStatus) -> Self {
        Self {
            task_id: task_id.to_string(),
            status,
            detail: None,
            original_request: None,
            created_at: None,
            duration_seconds: None,
            plan: None,
            outcome: None,
        }
    }

    /// Status plus an explanation, nothing else.
    pub fn notice(task_id: &str, status: TaskStatus, detail: &str) -> Self {
        Self {
            detail: Some(detail.to_string()),
            ..Self::base(task_id, status)
        }
    }

    pub fn not_found(task_id: &str, detail: &str) -> Self {
        Self::notice(task_id, TaskStatus::NotFound, detail)
    }

    pub fn pending(task: &PendingTask) -> Self {
        Self {
            original_request: Some(task.original_request.clone()),
            created_at: Some(task.created_at),
            plan: Some(task.plan.clone()),
            ..Self::base(&task.task_id, TaskStatus::Pending)
        }
    }

    pub fn completed(task: &CompletedTask) -> Self {
        Self {
            created_at: Some(task.created_at),
            duration_seconds: Some(task.duration_seconds),
            outcome: Some(task.outcome.clone()),
            ..Self::base(&task.task_id, TaskStatus::Completed)
        }
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
