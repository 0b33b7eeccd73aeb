//! Language-model access.
//!
//! Everything that talks to a model goes through [`CompletionModel`]: one
//! prompt in, one text completion out. Output is free text and carries no
//! schema guarantee; callers are responsible for parsing it.

pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod scripted;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpCompletionModel;
#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedModel;

/// Transport-level failures. Every variant is safe to retry.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Response(String),

    #[error("Model call timed out")]
    Timeout,
}

/// A single-shot text completion backend.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    /// Model identifier, used for logging and the health endpoint.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
