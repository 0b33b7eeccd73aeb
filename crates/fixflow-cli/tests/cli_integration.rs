//! Integration tests for the fixflow-cli commands.
//!
//! These tests exercise the same code paths as the binary, with scripted
//! models standing in for the provider.

use std::sync::Arc;

use fixflow_cli::commands;
use fixflow_core::config::AppConfig;
use fixflow_core::llm::ScriptedModel;
use fixflow_core::state::{AppState, AppStateInner};

/// A state where every agent and the planner share one scripted model.
fn test_state(model: Arc<ScriptedModel>) -> AppState {
    Arc::new(AppStateInner::with_model(model, &AppConfig::default()))
}

#[tokio::test]
async fn test_plan_preview_adds_email_only_to_workflow_steps() {
    let state = test_state(ScriptedModel::always(r#"["Run diagnosis", "Generate script"]"#));

    let preview = commands::plan::preview(&state, "Printer offline").await;

    assert_eq!(
        preview["steps"],
        serde_json::json!(["Run diagnosis", "Generate script"])
    );
    assert_eq!(
        preview["workflow_steps"],
        serde_json::json!(["Run diagnosis", "Generate script", "Write email"])
    );
}

#[tokio::test]
async fn test_plan_preview_falls_back_on_unusable_output() {
    let state = test_state(ScriptedModel::always(r#"{"steps": "unknown"}"#));

    let preview = commands::plan::preview(&state, "???").await;

    assert_eq!(preview["steps"], serde_json::json!(["Generate script"]));
}

#[tokio::test]
async fn test_run_with_approval_stores_pending_task() {
    let state = test_state(ScriptedModel::always(r#"["Run diagnosis"]"#));

    let view = commands::run::execute(&state, "Diagnose why my internet is slow.", true)
        .await
        .unwrap();

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["status"], "waiting_approval");
    assert!(json["task_id"].as_str().unwrap().starts_with("plan-"));
    assert_eq!(state.tasks.registry().counts().pending, 1);
}

#[tokio::test]
async fn test_run_rejects_empty_request() {
    let state = test_state(ScriptedModel::always("[]"));

    let err = commands::run::execute(&state, "", false).await.unwrap_err();

    assert!(err.contains("Bad request"));
}

#[test]
fn test_load_config_missing_file_is_an_error() {
    let err = commands::load_config(Some(std::path::Path::new("/nonexistent/fixflow.yaml")))
        .unwrap_err();
    assert!(err.contains("Failed to load configuration"));
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixflow.yaml");
    std::fs::write(
        &path,
        "server:\n  port: 4321\nmodel:\n  api_key: sk-from-file\n  model: gpt-4o-mini\n",
    )
    .unwrap();

    let config = commands::load_config(Some(&path)).unwrap();

    assert_eq!(config.server.port, 4321);
    assert!(!config.model.api_key.is_empty());
    assert!(!config.model.base_url.is_empty());
}
