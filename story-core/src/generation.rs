//! Story generation with graceful degradation.
//!
//! [`StoryWriter`] tries the remote generator and falls back to the
//! deterministic templates in [`crate::fallback`] whenever that is not
//! possible. The result says which path produced the text and whether the
//! user should be told about it.

use crate::fallback::fallback_story;
use crate::params::GenerationParameters;
use crate::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use async_trait::async_trait;
use openai::{Message, OpenAi, Request};
use std::sync::Arc;
use thiserror::Error;

/// Sampling temperature for story requests.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens.
pub const DEFAULT_MAX_TOKENS: usize = 800;

const INVALID_CREDENTIAL_ADVISORY: &str =
    "Invalid API key. Please check your OpenAI API key. Using demo story instead.";

const RATE_LIMIT_NOTICE: &str = "API rate limit reached. Showing demo story. \
Wait a few minutes and try again for AI-generated content.";

/// Why remote generation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("The API key was rejected")]
    Unauthenticated,

    #[error("Rate limit reached")]
    RateLimited,

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Generation failed: {0}")]
    Other(String),
}

impl From<openai::Error> for GenerationError {
    fn from(err: openai::Error) -> Self {
        if err.is_unauthorized() || matches!(err, openai::Error::NoApiKey) {
            GenerationError::Unauthenticated
        } else if err.is_rate_limited() {
            GenerationError::RateLimited
        } else if err.is_network() {
            GenerationError::NetworkUnavailable(err.to_string())
        } else {
            GenerationError::Other(err.to_string())
        }
    }
}

/// Something that turns a prompt into story text.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, GenerationError>;
}

/// Generator backed by the chat-completions API.
#[derive(Debug, Clone)]
pub struct ChatCompletionGenerator {
    client: OpenAi,
    temperature: f32,
    max_tokens: usize,
}

impl ChatCompletionGenerator {
    pub fn new(client: OpenAi) -> Self {
        Self {
            client,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl StoryGenerator for ChatCompletionGenerator {
    async fn generate(&self, prompt: &str, credential: &str) -> Result<String, GenerationError> {
        let request = Request::new(vec![
            Message::system(SYSTEM_INSTRUCTION),
            Message::user(prompt),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let response = self.client.complete(request, credential).await?;
        let text = response.text();
        if text.is_empty() {
            return Err(GenerationError::Other("Empty story text".to_string()));
        }
        Ok(text.to_string())
    }
}

/// Why fallback text was used without bothering the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NoCredential,
    RateLimited,
    NetworkUnavailable,
    ServiceError(String),
}

/// The result of writing a story. Every variant carries displayable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The remote generator wrote the story.
    Generated { text: String },

    /// Fallback text was used quietly.
    Fallback { text: String, reason: FallbackReason },

    /// Fallback text was used and the user needs to act.
    Failed { text: String, error: GenerationError },
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Generated { text }
            | GenerationOutcome::Fallback { text, .. }
            | GenerationOutcome::Failed { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Generated { text }
            | GenerationOutcome::Fallback { text, .. }
            | GenerationOutcome::Failed { text, .. } => text,
        }
    }

    /// Whether the text came from the fallback templates.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, GenerationOutcome::Generated { .. })
    }

    /// A message the user has to act on. Only a rejected credential has one.
    pub fn advisory(&self) -> Option<&'static str> {
        match self {
            GenerationOutcome::Failed {
                error: GenerationError::Unauthenticated,
                ..
            } => Some(INVALID_CREDENTIAL_ADVISORY),
            _ => None,
        }
    }

    /// Soft explanation to show next to the demo marker.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            GenerationOutcome::Fallback {
                reason: FallbackReason::RateLimited,
                ..
            } => Some(RATE_LIMIT_NOTICE),
            _ => None,
        }
    }
}

/// Writes stories, degrading to templates when the generator can't.
#[derive(Clone)]
pub struct StoryWriter {
    generator: Arc<dyn StoryGenerator>,
}

impl StoryWriter {
    pub fn new(generator: Arc<dyn StoryGenerator>) -> Self {
        Self { generator }
    }

    pub async fn write(
        &self,
        params: &GenerationParameters,
        credential: Option<&str>,
    ) -> GenerationOutcome {
        let credential = credential.map(str::trim).filter(|c| !c.is_empty());
        let Some(credential) = credential else {
            tracing::debug!("No API key, using fallback story");
            return GenerationOutcome::Fallback {
                text: fallback_story(params),
                reason: FallbackReason::NoCredential,
            };
        };

        let prompt = build_prompt(params);
        tracing::debug!(scenario = %params.scenario, age = params.age, "Generating story");

        match self.generator.generate(&prompt, credential).await {
            Ok(text) => GenerationOutcome::Generated { text },
            Err(GenerationError::Unauthenticated) => {
                tracing::warn!("API key rejected, using fallback story");
                GenerationOutcome::Failed {
                    text: fallback_story(params),
                    error: GenerationError::Unauthenticated,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Generation failed, using fallback story");
                let reason = match err {
                    GenerationError::RateLimited => FallbackReason::RateLimited,
                    GenerationError::NetworkUnavailable(_) => FallbackReason::NetworkUnavailable,
                    GenerationError::Other(message) => FallbackReason::ServiceError(message),
                    GenerationError::Unauthenticated => {
                        FallbackReason::ServiceError("unauthenticated".to_string())
                    }
                };
                GenerationOutcome::Fallback {
                    text: fallback_story(params),
                    reason,
                }
            }
        }
    }
}

impl std::fmt::Debug for StoryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryWriter").finish_non_exhaustive()
    }
}
