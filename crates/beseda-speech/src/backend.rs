//! Speech synthesis backend abstraction.
//!
//! The backend is an injected capability owned by the caller, not ambient
//! global state, so the orchestrator can be tested against a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use beseda_core::types::LanguageTag;

/// A voice advertised by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Backend-specific voice identifier.
    pub id: String,
    pub name: String,
    /// BCP-47 locale tag, e.g. "ru-RU".
    pub locale: String,
    /// Backend marks this voice as higher quality than its siblings.
    #[serde(default)]
    pub high_quality: bool,
}

/// One utterance handed to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
    pub language: LanguageTag,
    /// Selected voice, or `None` for the backend default.
    pub voice: Option<VoiceInfo>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Speech synthesis capability.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Whether synthesis is usable at all (e.g. credentials present).
    fn is_available(&self) -> bool {
        true
    }

    /// Voices the backend can synthesize with. May be empty; the
    /// orchestrator degrades to the backend default voice.
    async fn voices(&self) -> Vec<VoiceInfo>;

    /// Synthesize one utterance. Resolves when the utterance has finished.
    async fn speak(&self, utterance: &UtteranceRequest) -> anyhow::Result<()>;

    /// Cancel all pending and active utterances. May return before the
    /// backend has actually stopped.
    fn cancel(&self);
}
