//! Triage workflow: the fixed four-stage pipeline.
//!
//! ```text
//! plan ──► diagnose ──► generate-script ──► write-email ──► done
//!            (skippable)    (skippable, retried)   (always)
//! ```
//!
//! Email writing runs whatever the plan says; only the two middle stages
//! consult the plan.

use std::sync::Arc;

use crate::agents::{AgentError, AgentToolkit};
use crate::workflow::planner::Planner;
use crate::workflow::state::WorkflowState;
use crate::workflow::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Plan,
    Diagnose,
    GenerateScript,
    WriteEmail,
}

impl Stage {
    pub const ENTRY: Stage = Stage::Plan;

    pub fn next(self) -> Option<Stage> {
        match self {
            Self::Plan => Some(Self::Diagnose),
            Self::Diagnose => Some(Self::GenerateScript),
            Self::GenerateScript => Some(Self::WriteEmail),
            Self::WriteEmail => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Diagnose => "diagnose",
            Self::GenerateScript => "generate_script",
            Self::WriteEmail => "write_email",
        }
    }
}

/// Immediate retries, no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

pub struct TriageWorkflow {
    planner: Arc<Planner>,
    agents: AgentToolkit,
    script_retry: RetryPolicy,
}

impl TriageWorkflow {
    pub fn new(planner: Arc<Planner>, agents: AgentToolkit) -> Self {
        Self {
            planner,
            agents,
            script_retry: RetryPolicy::default(),
        }
    }

    pub fn with_script_retry(mut self, policy: RetryPolicy) -> Self {
        self.script_retry = RetryPolicy {
            max_attempts: policy.max_attempts.max(1),
        };
        self
    }

    /// Run every stage in order over a fresh state.
    pub async fn run(&self, request: &str) -> Result<WorkflowState, WorkflowError> {
        let mut state = WorkflowState::new(request);
        let mut stage = Some(Stage::ENTRY);

        while let Some(current) = stage {
            self.run_stage(current, &mut state).await?;
            stage = current.next();
        }

        Ok(state)
    }

    async fn run_stage(&self, stage: Stage, state: &mut WorkflowState) -> Result<(), WorkflowError> {
        match stage {
            Stage::Plan => {
                let plan = self.planner.plan(&state.request).await.with_email();
                tracing::info!("[Workflow] Final planned steps: {:?}", plan.names());
                state.apply_plan(&plan);
            }
            Stage::Diagnose => {
                if state.skip_diagnosis {
                    tracing::info!("[Workflow] Skipping diagnosis step");
                    return Ok(());
                }
                tracing::info!("[Workflow] Running diagnosis...");
                state.diagnosis = Some(self.agents.diagnosis.run(&state.request).await?);
            }
            Stage::GenerateScript => {
                if state.skip_script {
                    tracing::info!("[Workflow] Skipping script generation step");
                    return Ok(());
                }
                tracing::info!("[Workflow] Running script generation...");
                state.script = Some(self.generate_script(&state.request).await?);
            }
            Stage::WriteEmail => {
                tracing::info!("[Workflow] Running email writer...");
                state.email_draft = Some(self.agents.email.run(state.diagnosis.as_ref()).await?);
            }
        }
        Ok(())
    }

    async fn generate_script(
        &self,
        request: &str,
    ) -> Result<crate::agents::ScriptResult, WorkflowError> {
        let attempts = self.script_retry.max_attempts;
        let mut last_error: Option<AgentError> = None;

        for attempt in 1..=attempts {
            match self.agents.script.run(request).await {
                Ok(script) => return Ok(script),
                Err(e) => {
                    tracing::warn!("[Workflow] Script attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        Err(WorkflowError::ScriptGenerationExhausted {
            attempts,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
