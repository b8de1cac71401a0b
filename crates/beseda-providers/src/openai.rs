//! OpenAI Chat Completions API client.
//!
//! Also serves OpenRouter, Ollama, and other OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use beseda_core::config::ModelConfig;

use crate::{ChatMessage, CompletionRequest, LlmClient};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    provider_id: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(provider_id: &str, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            provider_id: provider_id.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from config; the base URL falls back per provider id.
    pub fn from_config(config: &ModelConfig) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(match config.provider.as_str() {
            "openrouter" => OPENROUTER_BASE_URL,
            "ollama" => OLLAMA_BASE_URL,
            _ => OPENAI_BASE_URL,
        });
        Self::new(&config.provider, base_url, config.resolve_api_key())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_body(request: &CompletionRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|ChatMessage { role, content }| json!({ "role": role, "content": content }))
        .collect();

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
    });
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn id(&self) -> &str {
        &self.provider_id
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(provider = %self.provider_id, model = %request.model, "requesting completion");

        let mut http = self.client.post(&url).json(&build_body(request));
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let resp = http.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {status}: {body}");
        }

        let parsed: ChatCompletionResponse = resp.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("completion response contained no text"))?;

        Ok(text)
    }
}
