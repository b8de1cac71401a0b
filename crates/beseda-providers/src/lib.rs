//! LLM client abstraction.
//!
//! One operation: given a prompt, return the raw completion text. The
//! extractor downstream imposes the only contract on that text, and it
//! tolerates violations — so the client stays deliberately thin.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message role in a chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A request for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

/// The core LLM client trait.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider identifier (e.g., "openai", "openrouter").
    fn id(&self) -> &str;

    /// Run one completion and return the raw text.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String>;
}
