//! fixflow core: transport-agnostic domain logic for the IT-support task
//! orchestrator.
//!
//! A free-text request is planned into a subset of three LLM-backed steps
//! (diagnosis, script generation, email drafting) and either executed right
//! away or held for human approval. This crate has **no HTTP framework
//! dependency** by default, so the same logic serves:
//!
//! - the HTTP server (via `fixflow-server`)
//! - the `fixflow` CLI
//!
//! # Feature Flags
//!
//! - `axum`: Enables `IntoResponse` impl on `ServerError` for use in axum handlers.
//! - `test-support`: Exposes `llm::ScriptedModel` for downstream tests.

pub mod agents;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod service;
pub mod state;
pub mod store;
pub mod workflow;

// Convenience re-exports
pub use config::AppConfig;
pub use error::ServerError;
pub use service::{ExecuteRequest, TaskService};
pub use state::{AppState, AppStateInner};
