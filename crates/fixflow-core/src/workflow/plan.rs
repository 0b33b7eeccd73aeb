//! Plan types: the closed vocabulary of steps and ordered plans over it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The steps a plan can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Diagnosis,
    ScriptGeneration,
    EmailWriting,
}

impl StepKind {
    pub const ALL: [StepKind; 3] = [
        StepKind::Diagnosis,
        StepKind::ScriptGeneration,
        StepKind::EmailWriting,
    ];

    /// Wire name, as used by the planner prompt and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnosis => "Run diagnosis",
            Self::ScriptGeneration => "Generate script",
            Self::EmailWriting => "Write email",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry of a plan. Names outside the vocabulary are kept so that
/// executors can skip them instead of rejecting the whole plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedStep {
    Known(StepKind),
    Unrecognized(String),
}

impl PlannedStep {
    pub fn parse(name: &str) -> Self {
        match StepKind::from_name(name) {
            Some(kind) => Self::Known(kind),
            None => Self::Unrecognized(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Known(kind) => kind.as_str(),
            Self::Unrecognized(name) => name,
        }
    }

    pub fn kind(&self) -> Option<StepKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unrecognized(_) => None,
        }
    }
}

impl Serialize for PlannedStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PlannedStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// An ordered, duplicate-free sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<PlannedStep>,
}

impl Plan {
    /// Build a plan from raw names, keeping the first occurrence of each.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plan = Self::default();
        for name in names {
            plan.push(PlannedStep::parse(name.as_ref()));
        }
        plan
    }

    pub fn from_kinds(kinds: &[StepKind]) -> Self {
        let mut plan = Self::default();
        for kind in kinds {
            plan.push(PlannedStep::Known(*kind));
        }
        plan
    }

    /// The plan used whenever the planner cannot produce one.
    pub fn fallback() -> Self {
        Self::from_kinds(&[StepKind::ScriptGeneration])
    }

    fn push(&mut self, step: PlannedStep) {
        if !self.steps.contains(&step) {
            self.steps.push(step);
        }
    }

    pub fn contains(&self, kind: StepKind) -> bool {
        self.steps.iter().any(|s| s.kind() == Some(kind))
    }

    /// Append `Write email` unless the plan already has it.
    pub fn with_email(mut self) -> Self {
        self.push(PlannedStep::Known(StepKind::EmailWriting));
        self
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub const PLAN_SUMMARY: &str = "Plan dynamically generated by the planner based on the request";

/// Plan as stored on a pending task and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub steps: Plan,
    pub summary: String,
}

impl PlanSummary {
    pub fn new(steps: Plan) -> Self {
        Self {
            steps,
            summary: PLAN_SUMMARY.to_string(),
        }
    }
}
