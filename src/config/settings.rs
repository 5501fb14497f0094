//! Configuration settings for LectureMind.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub youtube: YoutubeSettings,
    pub llm: LlmSettings,
    pub prompts: PromptSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// YouTube metadata and caption settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// oEmbed endpoint used for video titles.
    pub oembed_url: String,
    /// Timeout for the oEmbed request, in seconds.
    pub metadata_timeout_seconds: u64,
    /// Caption languages in order of preference.
    pub transcript_languages: Vec<String>,
    /// Timeout for each caption request, in seconds.
    pub transcript_timeout_seconds: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            oembed_url: "https://www.youtube.com/oembed".to_string(),
            metadata_timeout_seconds: 10,
            transcript_languages: vec!["en".to_string(), "hi".to_string()],
            transcript_timeout_seconds: 30,
        }
    }
}

impl YoutubeSettings {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_seconds)
    }

    pub fn transcript_timeout(&self) -> Duration {
        Duration::from_secs(self.transcript_timeout_seconds)
    }
}

/// Language model settings.
///
/// Any OpenAI-compatible chat completions endpoint works; the default points
/// at Gemini's compatibility layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout, in seconds.
    pub timeout_seconds: u64,
    /// Number of multiple-choice questions requested per lecture.
    pub quiz_size: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-flash-latest".to_string(),
            temperature: 0.7,
            timeout_seconds: 300,
            quiz_size: 10,
        }
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> crate::error::Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(crate::error::LectureMindError::Config(format!(
                "{} is empty. Set it with: export {}='...'",
                self.api_key_env, self.api_key_env
            ))),
            Err(_) => Err(crate::error::LectureMindError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                self.api_key_env, self.api_key_env
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lecturemind")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.youtube.metadata_timeout(), Duration::from_secs(10));
        assert_eq!(settings.youtube.transcript_languages, vec!["en", "hi"]);
        assert_eq!(settings.llm.quiz_size, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gemini-2.0-flash\"\n").unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.llm.model, "gemini-2.0-flash");
        assert_eq!(settings.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = PathBuf::from("/nonexistent/lecturemind/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.youtube.oembed_url, "https://www.youtube.com/oembed");
    }

    #[test]
    fn test_api_key_missing_variable() {
        let llm = LlmSettings {
            api_key_env: "LECTUREMIND_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmSettings::default()
        };
        assert!(llm.api_key().is_err());
    }
}
