//! In-memory tutoring session. Persistence is the caller's concern.

use std::sync::Arc;

use tracing::debug;

use beseda_core::config::ModelConfig;
use beseda_core::types::{TutorReply, WordLookup};
use beseda_core::{BesedaError, Result};
use beseda_extract::{extract_tutor_reply, extract_word_lookup};
use beseda_providers::{ChatMessage, CompletionRequest, LlmClient};

use crate::prompt::{build_lookup_prompt, build_tutor_system_prompt, StudentLevel};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 1024;

pub struct TutorSession {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    temperature: Option<f64>,
    level: StudentLevel,
    /// Conversation turns so far; assistant entries keep the raw completion
    /// so the model sees its own response format.
    history: Vec<ChatMessage>,
}

impl TutorSession {
    pub fn new(client: Arc<dyn LlmClient>, config: &ModelConfig, level: StudentLevel) -> Self {
        Self {
            client,
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.into()),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature,
            level,
            history: Vec::new(),
        }
    }

    /// Run one tutoring turn. Extraction never fails; a provider/network
    /// error is the only way this returns `Err`.
    pub async fn respond(&mut self, user_text: &str) -> Result<TutorReply> {
        let mut messages = vec![ChatMessage::system(build_tutor_system_prompt(self.level))];
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(user_text));

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let raw = self
            .client
            .complete(&request)
            .await
            .map_err(|e| BesedaError::Provider(e.to_string()))?;

        debug!(chars = raw.len(), "completion received");

        self.history.push(ChatMessage::user(user_text));
        self.history.push(ChatMessage::assistant(raw.clone()));

        Ok(extract_tutor_reply(&raw))
    }

    /// One-shot word lookup; does not touch the conversation history.
    pub async fn lookup(&self, word: &str) -> Result<WordLookup> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(build_lookup_prompt(word))],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let raw = self
            .client
            .complete(&request)
            .await
            .map_err(|e| BesedaError::Provider(e.to_string()))?;

        Ok(extract_word_lookup(&raw))
    }

    pub fn turn_count(&self) -> usize {
        self.history.len() / 2
    }
}

/// Spoken form of a reply: the reply itself followed by the follow-up
/// question. Tips and corrections stay on screen only.
pub fn speech_text(reply: &TutorReply) -> String {
    format!("{} {}", reply.reply, reply.follow_up)
}
