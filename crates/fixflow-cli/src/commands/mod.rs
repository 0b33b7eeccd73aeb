//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and goes through
//! the fixflow-core `TaskService` held in `AppState`.

pub mod plan;
pub mod run;
pub mod server;

use std::path::Path;
use std::sync::Arc;

use fixflow_core::config::AppConfig;
use fixflow_core::state::{AppState, AppStateInner};

/// Load the config and build a shared `AppState` backed by the HTTP model.
pub fn init_state(config_path: Option<&Path>) -> Result<AppState, String> {
    let config = load_config(config_path)?;
    let inner = AppStateInner::from_config(&config).map_err(|e| e.to_string())?;
    Ok(Arc::new(inner))
}

pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, String> {
    AppConfig::load(config_path).map_err(|e| format!("Failed to load configuration: {}", e))
}

/// Load `.env.local` and `.env` into the process environment.
///
/// Variables that are already set are left alone.
pub fn load_dotenv() {
    // .env.local first so it wins over .env
    for filename in &[".env.local", ".env"] {
        let path = Path::new(filename);
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        for (key, value) in content.lines().filter_map(parse_env_line) {
            if std::env::var(&key).is_err() {
                std::env::set_var(&key, &value);
            }
        }
        tracing::debug!("[CLI] Loaded environment from '{}'", filename);
    }
}

/// Parse one `KEY=VALUE` line. Comments and blank lines yield `None`.
pub fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let mut value = value.trim();
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value = &value[1..value.len() - 1];
    }
    Some((key.to_string(), value.to_string()))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
