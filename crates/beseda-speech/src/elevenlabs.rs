//! ElevenLabs synthesis backend — streams audio to files under the data dir.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use beseda_core::config::{data_dir, SpeechConfig};
use beseda_core::types::LanguageTag;

use crate::backend::{SpeechBackend, UtteranceRequest, VoiceInfo};

// ElevenLabs stock voices; overridable per language in config.
const DEFAULT_RUSSIAN_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";
const DEFAULT_ENGLISH_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM"; // "Rachel"
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

pub struct ElevenLabsBackend {
    api_key: Option<String>,
    russian_voice: String,
    english_voice: String,
    output_format: String,
    client: reqwest::Client,
    cancelled: AtomicBool,
}

impl ElevenLabsBackend {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            api_key: config.resolve_api_key(),
            russian_voice: config
                .russian_voice
                .clone()
                .unwrap_or_else(|| DEFAULT_RUSSIAN_VOICE_ID.into()),
            english_voice: config
                .english_voice
                .clone()
                .unwrap_or_else(|| DEFAULT_ENGLISH_VOICE_ID.into()),
            output_format: config
                .output_format
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.into()),
            client: reqwest::Client::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    fn default_voice_for(&self, language: LanguageTag) -> &str {
        match language {
            LanguageTag::Russian => &self.russian_voice,
            LanguageTag::English => &self.english_voice,
        }
    }

    /// Generate a unique output filename.
    fn output_filename(&self) -> PathBuf {
        let dir = data_dir().join("audio");
        let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let id = uuid::Uuid::new_v4().simple().to_string();
        let ext = match self.output_format.as_str() {
            f if f.starts_with("mp3") => "mp3",
            f if f.starts_with("pcm") => "pcm",
            f if f.starts_with("ulaw") => "ulaw",
            _ => "mp3",
        };
        dir.join(format!("tts_{ts}_{}.{ext}", &id[..8]))
    }
}

/// Build the ElevenLabs streaming TTS request URL for a given voice.
pub fn build_tts_url(voice: &str, output_format: &str) -> String {
    format!("https://api.elevenlabs.io/v1/text-to-speech/{voice}/stream?output_format={output_format}")
}

#[async_trait]
impl SpeechBackend for ElevenLabsBackend {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        vec![
            VoiceInfo {
                id: self.russian_voice.clone(),
                name: "Russian tutor".into(),
                locale: "ru-RU".into(),
                high_quality: false,
            },
            VoiceInfo {
                id: self.english_voice.clone(),
                name: "English conversational".into(),
                locale: "en-US".into(),
                high_quality: true,
            },
        ]
    }

    async fn speak(&self, utterance: &UtteranceRequest) -> anyhow::Result<()> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No speech API key configured"))?;

        self.cancelled.store(false, Ordering::SeqCst);

        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.id.as_str())
            .unwrap_or_else(|| self.default_voice_for(utterance.language));

        let url = build_tts_url(voice, &self.output_format);

        debug!(voice, language = ?utterance.language, chars = utterance.text.len(), "starting synthesis");

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "text": utterance.text,
                "model_id": DEFAULT_MODEL,
                "voice_settings": {
                    "stability": 0.5,
                    "similarity_boost": 0.75,
                    "speed": utterance.rate,
                },
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Speech API error {status}: {body}");
        }

        let file_path = self.output_filename();
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&file_path).await?;

        let mut stream = resp.bytes_stream();
        let mut total = 0usize;

        while let Some(chunk_result) = stream.next().await {
            if self.cancelled.load(Ordering::SeqCst) {
                debug!("synthesis cancelled, dropping remainder of stream");
                break;
            }
            let bytes = chunk_result?;
            total += bytes.len();
            file.write_all(&bytes).await?;
        }
        file.flush().await?;

        info!(
            path = %file_path.display(),
            size_kb = total / 1024,
            voice,
            "utterance synthesized"
        );

        Ok(())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
