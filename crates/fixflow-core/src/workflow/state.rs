//! The accumulator carried through one workflow run.

use serde::Serialize;

use crate::agents::{DiagnosisResult, ScriptResult};
use crate::workflow::plan::{Plan, StepKind};

/// Owned by a single run; stages write to it strictly in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub request: String,
    pub diagnosis: Option<DiagnosisResult>,
    pub script: Option<ScriptResult>,
    pub email_draft: Option<String>,
    pub skip_diagnosis: bool,
    pub skip_script: bool,
}

impl WorkflowState {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            ..Self::default()
        }
    }

    pub fn apply_plan(&mut self, plan: &Plan) {
        self.skip_diagnosis = !plan.contains(StepKind::Diagnosis);
        self.skip_script = !plan.contains(StepKind::ScriptGeneration);
    }

    /// Response projection; skipped stages leave no key behind.
    pub fn report(&self) -> WorkflowReport {
        WorkflowReport {
            diagnosis: self.diagnosis.clone(),
            script: self.script.clone(),
            email_draft: self.email_draft.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<DiagnosisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptResult>,
    pub email_draft: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_plan_sets_skip_flags() {
        let mut state = WorkflowState::new("req");
        state.apply_plan(&Plan::from_names(["Generate script"]));
        assert!(state.skip_diagnosis);
        assert!(!state.skip_script);
    }

    #[test]
    fn test_report_omits_skipped_outputs() {
        let mut state = WorkflowState::new("req");
        state.email_draft = Some("Hello".to_string());
        let json = serde_json::to_value(state.report()).unwrap();
        assert_eq!(json, serde_json::json!({ "email_draft": "Hello" }));
    }
}
