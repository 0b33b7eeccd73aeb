//! Runtime configuration.
//!
//! Configuration comes from an optional YAML file plus environment variables.
//! String values in the YAML file may reference the environment with
//! `${VAR}` or `${VAR:-default}`:
//!
//! ```yaml
//! server:
//!   host: "0.0.0.0"
//!   port: 8080
//! model:
//!   provider: openai
//!   model: "${FIXFLOW_MODEL:-gpt-3.5-turbo}"
//!   api_key: "${OPENAI_API_KEY}"
//!   timeout_secs: 60
//! workflow:
//!   script_attempts: 3
//! ```
//!
//! The model credential is mandatory: [`AppConfig::load`] fails fast when it
//! cannot be resolved.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable carrying the model-provider credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "FIXFLOW_MODEL";
pub const BASE_URL_ENV: &str = "FIXFLOW_BASE_URL";
pub const PROVIDER_ENV: &str = "FIXFLOW_PROVIDER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("OPENAI_API_KEY environment variable is not set. Please set it to your model provider API key.")]
    MissingCredential,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI-compatible `/chat/completions`
    #[default]
    #[serde(alias = "openai-compatible")]
    OpenAi,
    /// Anthropic-compatible `/v1/messages`
    Anthropic,
}

impl FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "openai-compatible" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(ConfigError::Invalid(format!("Unknown provider: '{}'", s))),
        }
    }
}

impl ModelProvider {
    fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Connection settings for the completion model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    /// Empty means "provider default".
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f64>,
    /// Call-level timeout applied to every model request.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            base_url: String::new(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3210,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    /// Attempts allowed for the script-generation stage.
    pub script_attempts: u32,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self { script_attempts: 3 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub model: ModelConfig,
    pub workflow: WorkflowSection,
}

impl AppConfig {
    /// Parse a config from YAML text, expanding `${VAR}` references first.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let expanded = resolve_env_vars(yaml);
        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Load the optional config file, apply environment overrides and
    /// validate. This is the startup entry point.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment variables win over file values.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.model.api_key = key;
            }
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            self.model.model = model;
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            self.model.base_url = base_url;
        }
        if let Ok(provider) = std::env::var(PROVIDER_ENV) {
            self.model.provider = provider.parse()?;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        // An unset `${VAR}` survives expansion verbatim.
        let api_key = self.model.api_key.trim();
        if api_key.is_empty() || has_unresolved_reference(api_key) {
            return Err(ConfigError::MissingCredential);
        }
        if self.model.base_url.trim().is_empty() {
            self.model.base_url = self.model.provider.default_base_url().to_string();
        }
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model name must not be empty".to_string()));
        }
        if self.model.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        if self.workflow.script_attempts == 0 {
            return Err(ConfigError::Invalid("script_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn has_unresolved_reference(value: &str) -> bool {
    value
        .find("${")
        .is_some_and(|start| value[start..].contains('}'))
}

/// Resolve environment variable references in a string.
/// Supports `${ENV_VAR}` and `${ENV_VAR:-default}` syntax.
/// Unknown variables without a default are left untouched.
pub fn resolve_env_vars(input: &str) -> String {
    let re = match regex::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return input.to_string(),
    };
    re.replace_all(input, |caps: &regex::Captures| {
        let var_expr = &caps[1];
        if let Some(idx) = var_expr.find(":-") {
            let var_name = &var_expr[..idx];
            let default_val = &var_expr[idx + 2..];
            std::env::var(var_name).unwrap_or_else(|_| default_val.to_string())
        } else {
            std::env::var(var_expr).unwrap_or_else(|_| format!("${{{}}}", var_expr))
        }
    })
    .to_string()
}
