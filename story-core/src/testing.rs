//! Testing utilities for story generation and playback.
//!
//! This module provides tools for integration testing:
//! - `MockGenerator` for deterministic generation without API calls
//! - `RecordingNarrator` for observing what the storybook asks to speak
//! - `TestHarness` for a session wired to in-memory collaborators

use crate::generation::{GenerationError, StoryGenerator};
use crate::narration::{Narrator, Utterance};
use crate::params::{GenerationParameters, LanguageLevel};
use crate::session::{SessionError, StorySession};
use crate::storage::{KeyValueStore, MemoryStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Text returned once the scripted results run out.
pub const DEFAULT_MOCK_STORY: &str = "My Mock Story\n\nThis is a mock story.\n\nThe end!";

/// A generator that returns scripted results.
///
/// Results are returned in order; once exhausted every call succeeds with
/// [`DEFAULT_MOCK_STORY`]. Prompts are recorded for inspection.
#[derive(Debug, Default)]
pub struct MockGenerator {
    results: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful generation.
    pub fn with_story(self, text: impl Into<String>) -> Self {
        self.queue(Ok(text.into()));
        self
    }

    /// Queue a failed generation.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.queue(Err(error));
        self
    }

    pub fn queue(&self, result: Result<String, GenerationError>) {
        lock(&self.results).push_back(result);
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }
}

#[async_trait]
impl StoryGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _credential: &str) -> Result<String, GenerationError> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.results)
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_MOCK_STORY.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A narrator that records what it was asked to do.
#[derive(Debug, Clone)]
pub struct RecordingNarrator {
    available: bool,
    fails: bool,
    spoken: Vec<Utterance>,
    cancels: usize,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self {
            available: true,
            fails: false,
            spoken: Vec::new(),
            cancels: 0,
        }
    }

    /// A narrator that reports speech as unsupported.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// A narrator that claims support but never manages to start speaking.
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::new()
        }
    }

    pub fn spoken(&self) -> &[Utterance] {
        &self.spoken
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels
    }
}

impl Default for RecordingNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Narrator for RecordingNarrator {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, utterance: Utterance) -> bool {
        self.spoken.push(utterance);
        !self.fails
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}

/// School story parameters for a five-year-old named Sam.
pub fn sample_params() -> GenerationParameters {
    GenerationParameters::new("school", 5, LanguageLevel::Simple)
        .with_child_name("Sam")
        .with_concerns("loud noises")
}

/// A session over an in-memory store and a mock generator.
pub struct TestHarness {
    pub session: StorySession,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<MockGenerator>,
}

impl TestHarness {
    pub async fn new() -> Result<Self, SessionError> {
        Self::with_generator(MockGenerator::new()).await
    }

    pub async fn with_generator(generator: MockGenerator) -> Result<Self, SessionError> {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(generator);
        let session = StorySession::open(
            store.clone() as Arc<dyn KeyValueStore>,
            generator.clone() as Arc<dyn StoryGenerator>,
        )
        .await?;

        Ok(Self {
            session,
            store,
            generator,
        })
    }

    /// Store a credential so generation goes to the mock generator.
    pub async fn with_credential(mut self, credential: &str) -> Result<Self, SessionError> {
        self.session.set_credential(credential).await?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_script() {
        let generator = MockGenerator::new()
            .with_story("first")
            .with_error(GenerationError::RateLimited);

        assert_eq!(generator.generate("a", "k").await, Ok("first".to_string()));
        assert_eq!(
            generator.generate("b", "k").await,
            Err(GenerationError::RateLimited)
        );
        assert_eq!(
            generator.generate("c", "k").await,
            Ok(DEFAULT_MOCK_STORY.to_string())
        );
        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_recording_narrator() {
        let mut narrator = RecordingNarrator::new();
        assert!(narrator.speak(Utterance {
            id: crate::narration::UtteranceId(1),
            text: "Hi".to_string(),
            params: Default::default(),
        }));
        narrator.cancel();

        assert_eq!(narrator.spoken().len(), 1);
        assert_eq!(narrator.cancel_count(), 1);
        assert!(!RecordingNarrator::unavailable().is_available());
    }

    #[tokio::test]
    async fn test_harness_generates() {
        let mut harness = TestHarness::new()
            .await
            .unwrap()
            .with_credential("sk-test")
            .await
            .unwrap();

        let story = harness.session.generate(sample_params()).await.unwrap();
        assert_eq!(story.content, DEFAULT_MOCK_STORY);
        assert_eq!(harness.generator.call_count(), 1);
    }
}
