//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level Beseda configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// API key for the synthesis provider. Prefer `api_key_env` in shared
    /// configs so the key never lands on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Voice ID used for Russian runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub russian_voice: Option<String>,

    /// Voice ID used for English runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_voice: Option<String>,

    /// Speaking rate. Kept below 1.0 so learners can follow along.
    #[serde(default = "default_rate")]
    pub rate: f32,

    #[serde(default = "default_pitch")]
    pub pitch: f32,

    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Synthesis output format (e.g. `mp3_44100_128`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

fn default_rate() -> f32 {
    0.85
}

fn default_pitch() -> f32 {
    1.0
}

fn default_volume() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            russian_voice: None,
            english_voice: None,
            rate: default_rate(),
            pitch: default_pitch(),
            volume: default_volume(),
            output_format: None,
        }
    }
}

impl SpeechConfig {
    /// Resolve the API key from config or the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.is_empty())
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier ("openai", "openrouter", or any compatible API).
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model name sent to the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ModelConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Substitute `${ENV_VAR}` references in raw config text.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    ///
    /// A missing file yields the default config.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::BesedaError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::BesedaError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location: `~/.beseda/config.json`.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Effective speech settings, defaulted when the section is absent.
    pub fn speech(&self) -> SpeechConfig {
        self.speech.clone().unwrap_or_default()
    }
}

/// Base directory for Beseda data: `~/.beseda/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".beseda")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        // SAFETY: test-only, single-threaded test runner
        unsafe { std::env::set_var("BESEDA_TEST_KEY", "sekret") };
        let raw = r#"{"speech": {"api_key": "${BESEDA_TEST_KEY}"}}"#;
        let substituted = substitute_env_vars(raw);
        assert!(substituted.contains("sekret"));
        unsafe { std::env::remove_var("BESEDA_TEST_KEY") };
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = Config::load(Path::new("/nonexistent/beseda.json")).unwrap();
        assert!(config.speech.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_speech_defaults_slow_rate() {
        let speech = Config::default().speech();
        assert!(speech.rate < 1.0);
        assert_eq!(speech.pitch, 1.0);
    }

    #[test]
    fn test_load_json5_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                // tutoring setup
                speech: { rate: 0.8 },
                model: { provider: "openai", model: "gpt-4o-mini" },
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.speech.unwrap().rate, 0.8);
        assert_eq!(config.model.unwrap().provider, "openai");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.speech = Some(SpeechConfig {
            russian_voice: Some("ru-voice".into()),
            ..Default::default()
        });
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(
            loaded.speech.unwrap().russian_voice.as_deref(),
            Some("ru-voice")
        );
    }
}
