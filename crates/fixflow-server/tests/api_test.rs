//! End-to-end tests for the HTTP API.
//!
//! Each test boots a real server on an ephemeral port with scripted models,
//! then drives it over HTTP with reqwest.

use std::sync::Arc;

use fixflow_core::agents::{AgentToolkit, DiagnosisAgent, EmailAgent, ScriptAgent};
use fixflow_core::llm::ScriptedModel;
use fixflow_core::service::TaskService;
use fixflow_core::state::{AppState, AppStateInner};
use fixflow_core::workflow::{Planner, RetryPolicy};
use fixflow_server::{start_server_with_state, ServerConfig};
use serde_json::{json, Value};

const DIAGNOSIS_JSON: &str = r#"{"root_cause": "DNS resolver misconfigured",
    "evidence": ["nslookup timeouts"],
    "solutions": [{"title": "Reset DNS settings", "confidence": "high"}]}"#;
const SCRIPT_JSON: &str =
    r#"{"language": "powershell", "code": "Clear-DnsClientCache", "lint_passed": true}"#;
const EMAIL_TEXT: &str = "Hi, we found the cause of the slowdown.";

struct Models {
    planner: Arc<ScriptedModel>,
    diagnosis: Arc<ScriptedModel>,
    script: Arc<ScriptedModel>,
    email: Arc<ScriptedModel>,
}

impl Models {
    fn healthy(plan: &str) -> Self {
        Self {
            planner: ScriptedModel::always(plan),
            diagnosis: ScriptedModel::always(DIAGNOSIS_JSON),
            script: ScriptedModel::always(SCRIPT_JSON),
            email: ScriptedModel::always(EMAIL_TEXT),
        }
    }

    fn state(&self) -> AppState {
        let agents = AgentToolkit::new(
            DiagnosisAgent::new(self.diagnosis.clone()),
            ScriptAgent::new(self.script.clone()),
            EmailAgent::new(self.email.clone()),
        );
        let service = TaskService::new(
            Arc::new(Planner::new(self.planner.clone())),
            agents,
            RetryPolicy::default(),
        );
        Arc::new(AppStateInner::with_service(service, "scripted"))
    }
}

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(models: &Models) -> Self {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let addr = start_server_with_state(config, models.state())
            .await
            .expect("server should start");
        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut req = self.client.post(format!("{}{}", self.base, path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.expect("request should succeed");
        let status = resp.status().as_u16();
        (status, resp.json().await.expect("body should be JSON"))
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .expect("request should succeed");
        let status = resp.status().as_u16();
        (status, resp.json().await.expect("body should be JSON"))
    }

    async fn execute(&self, request: &str, require_approval: bool) -> (u16, Value) {
        self.post(
            "/api/v1/execute",
            Some(json!({ "request": request, "require_approval": require_approval })),
        )
        .await
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start(&Models::healthy("[]")).await;
    let (status, body) = server.get("/api/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "scripted");
    assert_eq!(body["tasks"]["pending"], 0);
}

#[tokio::test]
async fn test_direct_execution_returns_full_report() {
    let models = Models::healthy(r#"["Run diagnosis", "Generate script"]"#);
    let server = TestServer::start(&models).await;

    let (status, body) = server
        .execute("My application crashes after login. Please help resolve it.", false)
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["diagnosis"]["root_cause"], "DNS resolver misconfigured");
    assert_eq!(body["diagnosis"]["solutions"][0]["confidence"], "high");
    assert_eq!(body["script"]["code"], "Clear-DnsClientCache");
    assert_eq!(body["email_draft"], EMAIL_TEXT);
    assert!(body["duration_seconds"].as_f64().unwrap() >= 0.0);
    assert!(body["created_at"].is_string());

    let task_id = body["task_id"].as_str().unwrap();
    let (_, stored) = server.get(&format!("/api/v1/tasks/{}", task_id)).await;
    assert_eq!(stored["status"], "completed");
    assert_eq!(stored["email_draft"], EMAIL_TEXT);
}

#[tokio::test]
async fn test_email_only_plan_still_drafts_email() {
    let models = Models::healthy(r#"["Write email"]"#);
    let server = TestServer::start(&models).await;

    let (status, body) = server.execute("Let the user know the VPN is back", false).await;

    assert_eq!(status, 200);
    assert!(body.get("diagnosis").is_none());
    assert!(body.get("script").is_none());
    assert_eq!(body["email_draft"], EMAIL_TEXT);
    assert_eq!(models.diagnosis.calls(), 0);
    assert_eq!(models.script.calls(), 0);
}

#[tokio::test]
async fn test_approval_flow_executes_once() {
    let models = Models::healthy(r#"["Run diagnosis", "Write email"]"#);
    let server = TestServer::start(&models).await;

    let (status, pending) = server.execute("Diagnose why my internet is slow.", true).await;
    assert_eq!(status, 200);
    assert_eq!(pending["status"], "waiting_approval");
    assert_eq!(pending["original_request"], "Diagnose why my internet is slow.");
    assert_eq!(pending["plan"]["steps"], json!(["Run diagnosis", "Write email"]));
    assert!(pending["plan"]["summary"].is_string());
    // Nothing runs before approval.
    assert_eq!(models.diagnosis.calls(), 0);

    let task_id = pending["task_id"].as_str().unwrap().to_string();
    let (_, queried) = server.get(&format!("/api/v1/tasks/{}", task_id)).await;
    assert_eq!(queried["status"], "waiting_approval");
    assert_eq!(queried["plan"], pending["plan"]);

    let approve_path = format!("/api/v1/plans/{}/approve", task_id);
    let (status, approved) = server.post(&approve_path, None).await;
    assert_eq!(status, 200);
    assert_eq!(approved["status"], "completed");
    assert_eq!(
        approved["result"][0]["Run diagnosis"]["root_cause"],
        "DNS resolver misconfigured"
    );
    assert_eq!(approved["result"][1]["Write email"], EMAIL_TEXT);

    let (status, again) = server.post(&approve_path, None).await;
    assert_eq!(status, 200);
    assert_eq!(again["status"], "completed");
    assert_eq!(again["result"], approved["result"]);
    assert_eq!(models.diagnosis.calls(), 1);
    assert_eq!(models.email.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_approvals_execute_once() {
    let models = Models::healthy(r#"["Run diagnosis"]"#);
    let server = Arc::new(TestServer::start(&models).await);

    let (_, pending) = server.execute("Laptop fan is noisy", true).await;
    let path = format!("/api/v1/plans/{}/approve", pending["task_id"].as_str().unwrap());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let server = server.clone();
        let path = path.clone();
        handles.push(tokio::spawn(async move { server.post(&path, None).await }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(body["status"], "completed");
    }

    assert_eq!(models.diagnosis.calls(), 1);
}

#[tokio::test]
async fn test_reject_then_approve_is_refused() {
    let models = Models::healthy(r#"["Run diagnosis"]"#);
    let server = TestServer::start(&models).await;

    let (_, pending) = server.execute("Diagnose why my internet is slow.", true).await;
    let task_id = pending["task_id"].as_str().unwrap().to_string();

    let (status, rejected) = server
        .post(&format!("/api/v1/plans/{}/reject", task_id), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(rejected["status"], "rejected");

    let (status, body) = server
        .post(&format!("/api/v1/plans/{}/approve", task_id), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "rejected");
    assert!(body["detail"].is_string());
    assert_eq!(models.diagnosis.calls(), 0);

    let (_, again) = server
        .post(&format!("/api/v1/plans/{}/reject", task_id), None)
        .await;
    assert_eq!(again["status"], "rejected");

    let (_, queried) = server.get(&format!("/api/v1/tasks/{}", task_id)).await;
    assert_eq!(queried["status"], "rejected");
}

#[tokio::test]
async fn test_reject_after_completion_is_refused() {
    let models = Models::healthy(r#"["Write email"]"#);
    let server = TestServer::start(&models).await;

    let (_, pending) = server.execute("Tell the team the printer is fixed", true).await;
    let task_id = pending["task_id"].as_str().unwrap().to_string();
    server
        .post(&format!("/api/v1/plans/{}/approve", task_id), None)
        .await;

    let (status, body) = server
        .post(&format!("/api/v1/plans/{}/reject", task_id), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "completed");
    assert!(body["detail"].as_str().unwrap().contains("Cannot reject"));
}

#[tokio::test]
async fn test_unknown_ids_report_not_found() {
    let server = TestServer::start(&Models::healthy("[]")).await;

    let (status, body) = server.post("/api/v1/plans/nope/approve", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "not_found");

    let (_, body) = server.post("/api/v1/plans/nope/reject", None).await;
    assert_eq!(body["status"], "not_found");

    let (status, body) = server.get("/api/v1/tasks/nope").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "not_found");
    assert_eq!(body["task_id"], "nope");
}

#[tokio::test]
async fn test_empty_request_is_rejected() {
    let server = TestServer::start(&Models::healthy("[]")).await;

    let (status, body) = server.execute("  ", false).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, _) = server.post("/api/v1/execute", Some(json!({ "prompt": "x" }))).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_model_failure_maps_to_bad_gateway() {
    let models = Models {
        diagnosis: ScriptedModel::failing(),
        ..Models::healthy(r#"["Run diagnosis"]"#)
    };
    let server = TestServer::start(&models).await;

    let (status, body) = server.execute("Outlook keeps freezing", false).await;
    assert_eq!(status, 502);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_script_retry_exhaustion_fails_request() {
    let models = Models {
        script: ScriptedModel::failing(),
        ..Models::healthy(r#"["Generate script"]"#)
    };
    let server = TestServer::start(&models).await;

    let (status, body) = server.execute("Write a cleanup script", false).await;
    assert_eq!(status, 500);
    assert!(body["error"].as_str().unwrap().contains("3 attempts"));
    assert_eq!(models.script.calls(), 3);
}

#[tokio::test]
async fn test_script_recovers_on_retry() {
    let models = Models {
        script: Arc::new(
            ScriptedModel::new()
                .then_fail("503")
                .then_fail("503")
                .then_reply(SCRIPT_JSON),
        ),
        ..Models::healthy(r#"["Generate script"]"#)
    };
    let server = TestServer::start(&models).await;

    let (status, body) = server.execute("Write a cleanup script", false).await;
    assert_eq!(status, 200);
    assert_eq!(body["script"]["lint_passed"], true);
    assert_eq!(models.script.calls(), 3);
}
