//! Script generation agent: produces a remediation script for an issue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::{strip_code_fence, AgentError};
use crate::llm::CompletionModel;

const SCRIPT_PROMPT: &str = r#"You're an IT automation assistant.
Given this issue:

{issue}

Respond ONLY in this exact JSON format:
{
  "language": "powershell",
  "code": "...",
  "lint_passed": true
}
Do NOT add any explanation or plain text. Respond with just the JSON."#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResult {
    pub language: String,
    pub code: String,
    pub lint_passed: bool,
}

impl ScriptResult {
    pub fn unparseable() -> Self {
        Self {
            language: "unknown".to_string(),
            code: "# GPT response was not valid JSON.".to_string(),
            lint_passed: false,
        }
    }
}

pub struct ScriptAgent {
    model: Arc<dyn CompletionModel>,
}

impl ScriptAgent {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn run(&self, issue: &str) -> Result<ScriptResult, AgentError> {
        let prompt = SCRIPT_PROMPT.replace("{issue}", issue);
        let reply = self
            .model
            .complete(&prompt)
            .await
            .map_err(|source| AgentError::Retryable {
                agent: "script",
                source,
            })?;

        Ok(serde_json::from_str(strip_code_fence(&reply)).unwrap_or_else(|e| {
            tracing::warn!("[Script] Model reply did not match schema: {}", e);
            ScriptResult::unparseable()
        }))
    }
}
