//! Step agents: one model call each, behind a fixed prompt template.
//!
//! Agents never fail on bad model *output*: unparseable replies degrade to a
//! well-typed sentinel value. Only transport failures escape, as
//! [`AgentError::Retryable`].

pub mod diagnosis;
pub mod email;
pub mod script;

use std::sync::Arc;

use thiserror::Error;

use crate::llm::{CompletionModel, ModelError};

pub use diagnosis::{Confidence, DiagnosisAgent, DiagnosisResult, Solution};
pub use email::EmailAgent;
pub use script::{ScriptAgent, ScriptResult};

#[derive(Debug, Error)]
pub enum AgentError {
    /// The model call itself failed; the caller may retry.
    #[error("{agent} agent call failed: {source}")]
    Retryable {
        agent: &'static str,
        #[source]
        source: ModelError,
    },
}

/// The three agents shared by both workflows.
#[derive(Clone)]
pub struct AgentToolkit {
    pub diagnosis: Arc<DiagnosisAgent>,
    pub script: Arc<ScriptAgent>,
    pub email: Arc<EmailAgent>,
}

impl AgentToolkit {
    pub fn new(diagnosis: DiagnosisAgent, script: ScriptAgent, email: EmailAgent) -> Self {
        Self {
            diagnosis: Arc::new(diagnosis),
            script: Arc::new(script),
            email: Arc::new(email),
        }
    }

    /// Wire every agent to the same model.
    pub fn shared(model: Arc<dyn CompletionModel>) -> Self {
        Self::new(
            DiagnosisAgent::new(model.clone()),
            ScriptAgent::new(model.clone()),
            EmailAgent::new(model),
        )
    }
}

/// Strip whitespace and an enclosing Markdown code fence from a model reply.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "powershell", ...) on the opening line.
    match body.find('\n') {
        Some(idx) => body[idx + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```unterminated"), "```unterminated");
    }
}
