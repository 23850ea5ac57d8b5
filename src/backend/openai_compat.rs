//! OpenAI-compatible chat-completions backend.
//!
//! Covers every provider the explainer offers: OpenAI, Groq, Google
//! (OpenAI endpoint), Anthropic (OpenAI SDK compatibility), Mistral,
//! OpenRouter and Ollama.

use super::{Backend, Bindings, PromptTemplate};
use crate::config::BackendConfig;
use crate::error::{BackendError, ExplainError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

/// Default endpoint and API-key variable per provider.
fn preset(provider: &str) -> Option<(&'static str, &'static str)> {
    match provider {
        "openai" => Some(("https://api.openai.com/v1", "OPENAI_API_KEY")),
        "groq" => Some(("https://api.groq.com/openai/v1", "GROQ_API_KEY")),
        "google" => Some((
            "https://generativelanguage.googleapis.com/v1beta/openai",
            "GOOGLE_API_KEY",
        )),
        "anthropic" => Some(("https://api.anthropic.com/v1", "ANTHROPIC_API_KEY")),
        "mistralai" => Some(("https://api.mistral.ai/v1", "MISTRAL_API_KEY")),
        "openrouter" => Some(("https://openrouter.ai/api/v1", "OPENROUTER_API_KEY")),
        "ollama" => Some(("http://localhost:11434/v1", "")),
        _ => None,
    }
}

impl OpenAiCompatBackend {
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("http client: {e}")))?;
        let model = model.into();

        Ok(Self {
            name: format!("{}/{}", provider.into(), model),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model,
            temperature,
            client,
        })
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self, ExplainError> {
        let provider = cfg.provider.trim().to_ascii_lowercase();
        let preset = preset(&provider);

        let base_url = if !cfg.base_url.is_empty() {
            cfg.base_url.clone()
        } else if let Some((url, _)) = preset {
            url.to_string()
        } else {
            return Err(ExplainError::Config(format!(
                "unsupported API provider: {} (model: {}); set backend.base_url for a custom endpoint",
                cfg.provider, cfg.model
            )));
        };

        let key_env = if !cfg.api_key_env.is_empty() {
            cfg.api_key_env.as_str()
        } else {
            preset.map(|(_, env)| env).unwrap_or("")
        };
        let api_key = if key_env.is_empty() {
            "none".to_string()
        } else {
            std::env::var(key_env).map_err(|_| {
                ExplainError::Config(format!("environment variable {key_env} is not set"))
            })?
        };

        Self::new(
            provider,
            base_url,
            api_key,
            cfg.model.clone(),
            cfg.temperature,
            Duration::from_secs(cfg.timeout_seconds.max(1)),
        )
        .map_err(ExplainError::from)
    }
}

#[async_trait]
impl Backend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &PromptTemplate,
        bindings: &Bindings,
    ) -> Result<String, BackendError> {
        let content = prompt.render(bindings)?;
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
            "temperature": self.temperature,
            "stream": false,
        });

        debug!(backend = %self.name, prompt = prompt.name, chars = content.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(BackendError::RateLimited);
        }
        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "invalid API key or insufficient permissions".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "provider returned error");
            return Err(BackendError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| BackendError::Api {
            status_code: 200,
            message: format!("failed to parse response: {e}"),
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendError::EmptyResponse {
                model: self.model.clone(),
            })?;

        debug!(backend = %self.name, prompt = prompt.name, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}
