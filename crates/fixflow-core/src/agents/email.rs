//! Email agent: turns the diagnosis into a short email for the requester.

use std::sync::Arc;

use crate::agents::{AgentError, DiagnosisResult};
use crate::llm::CompletionModel;

const EMAIL_PROMPT: &str =
    "Summarize this diagnosis and proposed solutions into a short email:\n\n{diagnosis}";

pub struct EmailAgent {
    model: Arc<dyn CompletionModel>,
}

impl EmailAgent {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Draft the email. A missing diagnosis is summarized as "N/A".
    pub async fn run(&self, diagnosis: Option<&DiagnosisResult>) -> Result<String, AgentError> {
        let fallback;
        let diagnosis = match diagnosis {
            Some(d) => d,
            None => {
                fallback = DiagnosisResult::not_available();
                &fallback
            }
        };

        let rendered = serde_json::to_string_pretty(diagnosis)
            .unwrap_or_else(|_| diagnosis.root_cause.clone());
        let prompt = EMAIL_PROMPT.replace("{diagnosis}", &rendered);

        self.model
            .complete(&prompt)
            .await
            .map_err(|source| AgentError::Retryable {
                agent: "email",
                source,
            })
    }
}
