//! Core error type for the fixflow service boundary.
//!
//! `ServerError` is what `TaskService` operations return. Lower layers
//! (`ModelError`, `AgentError`, `WorkflowError`, `ConfigError`) convert into it
//! via `From`. When the `axum` feature is enabled, it also implements
//! `IntoResponse` so it can be used directly as an axum handler error type.
//!
//! Registry conflicts and unknown task ids are *not* errors; they are
//! reported as `TaskView` payloads.

use crate::agents::AgentError;
use crate::config::ConfigError;
use crate::workflow::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Model provider error: {0}")]
    Model(String),

    #[error("Workflow failed: {0}")]
    Workflow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        ServerError::Model(err.to_string())
    }
}

impl From<WorkflowError> for ServerError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Agent(agent) => agent.into(),
            other => ServerError::Workflow(other.to_string()),
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        ServerError::Config(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Model(_) => StatusCode::BAD_GATEWAY,
            ServerError::Workflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelError;

    #[test]
    fn agent_failures_map_to_model_errors() {
        let err: ServerError = WorkflowError::Agent(AgentError::Retryable {
            agent: "diagnosis",
            source: ModelError::Timeout,
        })
        .into();
        assert!(matches!(err, ServerError::Model(_)));
    }

    #[test]
    fn exhausted_retries_map_to_workflow_errors() {
        let err: ServerError = WorkflowError::ScriptGenerationExhausted {
            attempts: 3,
            last_error: "boom".to_string(),
        }
        .into();
        match err {
            ServerError::Workflow(msg) => assert!(msg.contains("3 attempts")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
