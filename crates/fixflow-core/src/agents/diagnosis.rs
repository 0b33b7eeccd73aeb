//! Diagnosis agent: root cause, evidence and ranked solutions for an issue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::{strip_code_fence, AgentError};
use crate::llm::CompletionModel;

const DIAGNOSIS_PROMPT: &str = r#"You are a diagnostic expert. A user reports the following issue:

{issue}

Analyze the root cause, list any evidence, and propose 2-3 solutions.
Respond in this JSON format:
{
  "root_cause": "...",
  "evidence": ["...", "..."],
  "solutions": [
    {"title": "...", "confidence": "high"},
    ...
  ]
}
"confidence" must be one of "high", "medium" or "low"."#;

const UNPARSEABLE_ROOT_CAUSE: &str = "Unable to parse GPT response";
const UNPARSEABLE_SOLUTION: &str = "Check GPT output format or retry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub title: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub root_cause: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub solutions: Vec<Solution>,
}

impl DiagnosisResult {
    /// Substitute used when the model reply does not match the schema.
    pub fn unparseable() -> Self {
        Self {
            root_cause: UNPARSEABLE_ROOT_CAUSE.to_string(),
            evidence: Vec::new(),
            solutions: vec![Solution {
                title: UNPARSEABLE_SOLUTION.to_string(),
                confidence: Confidence::Low,
            }],
        }
    }

    /// Placeholder the email agent summarizes when no diagnosis ran.
    pub fn not_available() -> Self {
        Self {
            root_cause: "N/A".to_string(),
            evidence: Vec::new(),
            solutions: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.root_cause == UNPARSEABLE_ROOT_CAUSE
    }
}

pub struct DiagnosisAgent {
    model: Arc<dyn CompletionModel>,
}

impl DiagnosisAgent {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn run(&self, issue: &str) -> Result<DiagnosisResult, AgentError> {
        let prompt = DIAGNOSIS_PROMPT.replace("{issue}", issue);
        let reply = self
            .model
            .complete(&prompt)
            .await
            .map_err(|source| AgentError::Retryable {
                agent: "diagnosis",
                source,
            })?;

        match serde_json::from_str::<DiagnosisResult>(strip_code_fence(&reply)) {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!("[Diagnosis] Model reply did not match schema: {}", e);
                Ok(DiagnosisResult::unparseable())
            }
        }
    }
}
