//! Runtime configuration.
//!
//! Built with defaults and overridden from the environment. The binary loads
//! `.env` before calling [`StoryConfig::from_env`].

use crate::generation::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use std::path::PathBuf;

pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV_VAR: &str = "SOCIAL_STORY_MODEL";
pub const DATA_DIR_ENV_VAR: &str = "SOCIAL_STORY_DATA_DIR";
pub const TTS_ENV_VAR: &str = "SOCIAL_STORY_TTS";

/// Directory for history, credential and logs when nothing else is set.
pub const DEFAULT_DATA_DIR: &str = ".social-story";

/// Configuration for a story session and its front end.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryConfig {
    /// Credential from the environment. Takes precedence over a stored one.
    pub api_key: Option<String>,

    pub base_url: String,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: usize,

    /// Where the file store and log file live.
    pub data_dir: PathBuf,

    /// Speech program used for narration. `None` disables narration.
    pub speech_program: Option<String>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: openai::DEFAULT_BASE_URL.to_string(),
            model: openai::DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            speech_program: None,
        }
    }
}

impl StoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any non-blank environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`StoryConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get(openai::API_KEY_ENV_VAR);
        if let Some(base_url) = get(BASE_URL_ENV_VAR) {
            config.base_url = base_url;
        }
        if let Some(model) = get(MODEL_ENV_VAR) {
            config.model = model;
        }
        if let Some(dir) = get(DATA_DIR_ENV_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        config.speech_program = get(TTS_ENV_VAR);
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_speech_program(mut self, program: impl Into<String>) -> Self {
        self.speech_program = Some(program.into());
        self
    }

    /// Path of the log file used by the terminal front end.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("social-story.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StoryConfig::new();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.data_dir, PathBuf::from(".social-story"));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", " sk-env "),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("SOCIAL_STORY_MODEL", "gpt-4o"),
            ("SOCIAL_STORY_DATA_DIR", "/tmp/stories"),
            ("SOCIAL_STORY_TTS", "espeak"),
        ]);
        let config = StoryConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/stories"));
        assert_eq!(config.speech_program.as_deref(), Some("espeak"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/stories/social-story.log"));
    }

    #[test]
    fn test_blank_environment_is_ignored() {
        let config = StoryConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config, StoryConfig::default());
    }
}
