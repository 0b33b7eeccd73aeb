//! Workflow engine: planning plus the two execution paths.
//!
//! # Architecture
//!
//! ```text
//! request ──► Planner ──► Plan
//!                           │
//!            ┌──────────────┴───────────────┐
//!            ▼                              ▼
//!     TriageWorkflow                   PlanExecutor
//!  (fixed stages, email always,     (named steps only,
//!   script stage retried)            used after approval)
//!            │                              │
//!            └────────► AgentToolkit ◄──────┘
//! ```

pub mod engine;
pub mod executor;
pub mod plan;
pub mod planner;
pub mod state;

use thiserror::Error;

use crate::agents::AgentError;

pub use engine::{RetryPolicy, Stage, TriageWorkflow};
pub use executor::{PlanExecutor, StepOutcome, StepOutput};
pub use plan::{Plan, PlanSummary, PlannedStep, StepKind};
pub use planner::Planner;
pub use state::{WorkflowReport, WorkflowState};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Script agent failed after {attempts} attempts: {last_error}")]
    ScriptGenerationExhausted { attempts: u32, last_error: String },
}
