//! Planner: decides which steps a request needs.
//!
//! The model is asked for a JSON list of step names, but replies arrive in
//! several shapes. They are normalized by an ordered chain of strategies;
//! the first strategy that matches wins:
//!
//! | strategy       | accepts                                  |
//! |----------------|------------------------------------------|
//! | `json-list`    | `["Run diagnosis", "Write email"]`       |
//! | `list-literal` | `"['Generate script']"`                  |
//! | `newline-list` | `"Generate script\nWrite email"`         |
//! | `bare-step`    | `"- Generate script"`                    |
//!
//! When the model is missing, fails, or no strategy matches, the planner
//! returns [`Plan::fallback`]. It never returns an error.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::agents::strip_code_fence;
use crate::llm::{CompletionModel, ModelError};
use crate::workflow::plan::Plan;

const PLANNER_PROMPT: &str = r#"Return the minimal JSON list of steps required for this task using ONLY the following:
- 'Run diagnosis'
- 'Generate script'
- 'Write email'

If the user explicitly asks for a script and does NOT request help understanding or troubleshooting, do NOT include 'Run diagnosis'. Only include it when the user asks about causes or problems.

If the user says they do not want a script or diagnosis, respect that. Always include 'Write email' unless the user clearly says not to.

Output must be a JSON list of steps.

Request: {request}
Steps:"#;

type Strategy = fn(&Value) -> Option<Vec<String>>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("json-list", json_list),
    ("list-literal", list_literal),
    ("newline-list", newline_list),
    ("bare-step", bare_step),
];

#[derive(Debug, Error)]
enum FallbackCause {
    #[error("planner model is not configured")]
    Unconfigured,
    #[error("planner model call failed: {0}")]
    Model(#[from] ModelError),
    #[error("unexpected planner output format: {0}")]
    Unrecognized(String),
}

pub struct Planner {
    model: Option<Arc<dyn CompletionModel>>,
}

impl Planner {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A planner with no model; every request gets the fallback plan.
    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    pub async fn plan(&self, request: &str) -> Plan {
        match self.try_plan(request).await {
            Ok(plan) => {
                tracing::info!("[Planner] Planned steps: {:?}", plan.names());
                plan
            }
            Err(cause) => {
                tracing::warn!("[Planner] Falling back to {:?}: {}", Plan::fallback().names(), cause);
                Plan::fallback()
            }
        }
    }

    async fn try_plan(&self, request: &str) -> Result<Plan, FallbackCause> {
        let model = self.model.as_ref().ok_or(FallbackCause::Unconfigured)?;
        let prompt = PLANNER_PROMPT.replace("{request}", request);
        let reply = model.complete(&prompt).await?;
        tracing::debug!("[Planner] Raw model output: {:?}", reply);

        let raw = read_model_output(&reply);
        normalize_steps(&raw)
            .map(Plan::from_names)
            .ok_or_else(|| FallbackCause::Unrecognized(raw.to_string()))
    }
}

/// Interpret a reply as JSON when it is JSON, otherwise as a plain string.
pub fn read_model_output(reply: &str) -> Value {
    let body = strip_code_fence(reply);
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Run the strategy chain over a raw planner output.
pub fn normalize_steps(raw: &Value) -> Option<Vec<String>> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let steps = strategy(raw)?;
        tracing::debug!("[Planner] Output matched '{}' strategy", name);
        Some(steps)
    })
}

fn clean_entry(entry: &str) -> String {
    entry
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

fn clean_all(entries: Vec<String>) -> Vec<String> {
    entries
        .iter()
        .map(|e| clean_entry(e))
        .filter(|e| !e.is_empty())
        .collect()
}

fn json_list(raw: &Value) -> Option<Vec<String>> {
    let items = raw.as_array()?;
    let names = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    Some(clean_all(names))
}

fn list_literal(raw: &Value) -> Option<Vec<String>> {
    let text = raw.as_str()?;
    let names: Vec<String> = serde_json::from_str(&text.trim().replace('\'', "\"")).ok()?;
    Some(clean_all(names))
}

fn newline_list(raw: &Value) -> Option<Vec<String>> {
    let text = raw.as_str()?;
    if !text.contains('\n') {
        return None;
    }
    Some(clean_all(text.lines().map(str::to_string).collect()))
}

fn bare_step(raw: &Value) -> Option<Vec<String>> {
    let step = clean_entry(raw.as_str()?);
    if step.is_empty() {
        return None;
    }
    Some(vec![step])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;
    use crate::workflow::plan::StepKind;
    use serde_json::json;

    #[test]
    fn test_all_shapes_normalize_to_the_same_token() {
        let shapes = [
            json!(["Generate script"]),
            json!("['Generate script']"),
            json!("Generate script\nWrite email"),
            json!("- Generate script"),
        ];
        for raw in shapes {
            let steps = normalize_steps(&raw).unwrap();
            assert_eq!(steps[0], "Generate script", "shape: {}", raw);
        }
    }

    #[test]
    fn test_newline_list_drops_blank_lines_and_bullets() {
        let steps = normalize_steps(&json!("- Run diagnosis\n\n  - Write email  \n")).unwrap();
        assert_eq!(steps, vec!["Run diagnosis", "Write email"]);
    }

    #[test]
    fn test_non_string_outputs_do_not_match() {
        assert!(normalize_steps(&json!(42)).is_none());
        assert!(normalize_steps(&json!({"steps": []})).is_none());
        assert!(normalize_steps(&json!([1, 2])).is_none());
        assert!(normalize_steps(&json!("  -  ")).is_none());
    }

    #[test]
    fn test_read_model_output() {
        assert_eq!(read_model_output("[\"Write email\"]"), json!(["Write email"]));
        assert_eq!(read_model_output("```json\n[\"Write email\"]\n```"), json!(["Write email"]));
        assert_eq!(read_model_output("['Write email']"), json!("['Write email']"));
    }

    #[tokio::test]
    async fn test_plan_from_model_reply() {
        let planner = Planner::new(ScriptedModel::always("['Run diagnosis', 'Write email']"));
        let plan = planner.plan("Diagnose why my internet is slow.").await;
        assert!(plan.contains(StepKind::Diagnosis));
        assert!(plan.contains(StepKind::EmailWriting));
        assert!(!plan.contains(StepKind::ScriptGeneration));
    }

    #[tokio::test]
    async fn test_prompt_carries_request() {
        let model = ScriptedModel::always("[\"Write email\"]");
        let planner = Planner::new(model.clone());
        planner.plan("printer jams").await;
        assert!(model.prompts()[0].ends_with("Request: printer jams\nSteps:"));
    }

    #[tokio::test]
    async fn test_fallback_when_model_fails() {
        let planner = Planner::new(ScriptedModel::failing());
        assert_eq!(planner.plan("anything").await, Plan::fallback());
    }

    #[tokio::test]
    async fn test_fallback_when_unconfigured() {
        let planner = Planner::unconfigured();
        assert_eq!(planner.plan("anything").await.names(), vec!["Generate script"]);
    }

    #[tokio::test]
    async fn test_fallback_when_output_unrecognized() {
        let planner = Planner::new(ScriptedModel::always("{\"steps\": 3}"));
        assert_eq!(planner.plan("anything").await, Plan::fallback());
    }
}
