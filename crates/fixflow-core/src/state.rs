//! Shared application state for the server and CLI.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::llm::{CompletionModel, HttpCompletionModel};
use crate::service::TaskService;
use crate::workflow::RetryPolicy;

/// Shared state accessible by all API handlers.
pub struct AppStateInner {
    pub tasks: TaskService,
    pub model_name: String,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    /// Build state backed by the configured HTTP model.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let model = HttpCompletionModel::new(config.model.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Ok(Self::with_model(Arc::new(model), config))
    }

    pub fn with_model(model: Arc<dyn CompletionModel>, config: &AppConfig) -> Self {
        let retry = RetryPolicy {
            max_attempts: config.workflow.script_attempts,
        };
        Self {
            model_name: model.model_name().to_string(),
            tasks: TaskService::from_model(model, retry),
        }
    }

    /// Use a prepared service, e.g. one with per-agent models.
    pub fn with_service(tasks: TaskService, model_name: impl Into<String>) -> Self {
        Self {
            tasks,
            model_name: model_name.into(),
        }
    }
}
