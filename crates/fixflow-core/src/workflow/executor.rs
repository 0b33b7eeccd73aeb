//! Plan executor: runs exactly the steps a stored plan names.
//!
//! Used after a plan is approved. Unlike [`TriageWorkflow`](super::TriageWorkflow)
//! there are no forced stages and no retries: the plan is followed as
//! written, in order, and names outside the step vocabulary are skipped.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::agents::{AgentError, AgentToolkit, DiagnosisResult, ScriptResult};
use crate::workflow::plan::{Plan, PlannedStep, StepKind};
use crate::workflow::state::WorkflowState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepOutput {
    Diagnosis(DiagnosisResult),
    Script(ScriptResult),
    Email(String),
}

/// Serialized as a single-entry object: `{"Run diagnosis": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: StepKind,
    pub output: StepOutput,
}

impl Serialize for StepOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.step.as_str(), &self.output)?;
        map.end()
    }
}

pub struct PlanExecutor {
    agents: AgentToolkit,
}

impl PlanExecutor {
    pub fn new(agents: AgentToolkit) -> Self {
        Self { agents }
    }

    pub async fn execute(&self, request: &str, plan: &Plan) -> Result<Vec<StepOutcome>, AgentError> {
        let mut state = WorkflowState::new(request);
        let mut outcomes = Vec::with_capacity(plan.len());

        for step in plan.steps() {
            let kind = match step {
                PlannedStep::Known(kind) => *kind,
                PlannedStep::Unrecognized(name) => {
                    tracing::info!("[Executor] No agent found for step: {}", name);
                    continue;
                }
            };

            tracing::info!("[Executor] Running: {}", kind);
            let output = match kind {
                StepKind::Diagnosis => {
                    let diagnosis = self.agents.diagnosis.run(&state.request).await?;
                    state.diagnosis = Some(diagnosis.clone());
                    StepOutput::Diagnosis(diagnosis)
                }
                StepKind::ScriptGeneration => {
                    let script = self.agents.script.run(&state.request).await?;
                    state.script = Some(script.clone());
                    StepOutput::Script(script)
                }
                StepKind::EmailWriting => {
                    let email = self.agents.email.run(state.diagnosis.as_ref()).await?;
                    state.email_draft = Some(email.clone());
                    StepOutput::Email(email)
                }
            };
            outcomes.push(StepOutcome { step: kind, output });
        }

        Ok(outcomes)
    }
}
