//! HTTP model client: calls an OpenAI- or Anthropic-compatible endpoint.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{ModelConfig, ModelProvider};
use crate::llm::{CompletionModel, ModelError};

/// Calls a hosted model over HTTP using the configured provider adapter.
pub struct HttpCompletionModel {
    client: reqwest::Client,
    config: ModelConfig,
}

impl HttpCompletionModel {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// POST {base_url}/chat/completions
    /// Headers:
    ///   Authorization: Bearer {api_key}
    async fn call_openai(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });
        if let Some(temp) = self.config.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        tracing::debug!("[ModelClient] POST {} (model: {})", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let json = read_json(response).await?;

        json.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ModelError::Response("missing choices[0].message.content".to_string()))
    }

    /// POST {base_url}/v1/messages
    /// Headers:
    ///   x-api-key: {api_key}
    ///   anthropic-version: 2023-06-01
    async fn call_anthropic(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 4096,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });
        if let Some(temp) = self.config.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        tracing::debug!("[ModelClient] POST {} (model: {})", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let json = read_json(response).await?;

        json.get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| {
                arr.iter()
                    .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
                    .map(|s| s.to_string())
                    .reduce(|a, b| format!("{}\n{}", a, b))
            })
            .ok_or_else(|| ModelError::Response("no text content blocks".to_string()))
    }
}

#[async_trait]
impl CompletionModel for HttpCompletionModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        match self.config.provider {
            ModelProvider::OpenAi => self.call_openai(prompt).await,
            ModelProvider::Anthropic => self.call_anthropic(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn map_send_error(err: reqwest::Error) -> ModelError {
    if err.is_timeout() {
        ModelError::Timeout
    } else {
        ModelError::Http(err.to_string())
    }
}

async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ModelError> {
    let status = response.status();
    let text = response.text().await.map_err(map_send_error)?;

    if !status.is_success() {
        return Err(ModelError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| ModelError::Response(format!("Failed to parse response JSON: {}", e)))
}
