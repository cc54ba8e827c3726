//! StorySession - the primary public API for story generation.
//!
//! This module wraps the story writer, the saved history and the credential
//! into a single interface used by both the terminal app and the headless
//! runner.

use crate::config::StoryConfig;
use crate::generation::{ChatCompletionGenerator, GenerationOutcome, StoryGenerator, StoryWriter};
use crate::history::StoryHistory;
use crate::params::GenerationParameters;
use crate::storage::{self, FileStore, KeyValueStore, StorageError};
use crate::story::Story;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors from StorySession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Client error: {0}")]
    Client(#[from] openai::Error),

    #[error("No story is open")]
    NoStory,

    #[error("No story with id {0}")]
    UnknownStory(String),
}

/// A story session.
///
/// Holds the story being viewed, the saved history and the message (if any)
/// the user should see about the last generation.
pub struct StorySession {
    store: Arc<dyn KeyValueStore>,
    writer: StoryWriter,
    history: StoryHistory,
    current: Option<Story>,
    advisory: Option<String>,
    notice: Option<String>,
    env_credential: Option<String>,
}

impl StorySession {
    /// Open a session, loading saved history from `store`.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn StoryGenerator>,
    ) -> Result<Self, SessionError> {
        let history = storage::load_history(store.as_ref()).await?;
        tracing::info!(stories = history.len(), "Opened story session");

        Ok(Self {
            store,
            writer: StoryWriter::new(generator),
            history,
            current: None,
            advisory: None,
            notice: None,
            env_credential: None,
        })
    }

    /// Open a session with a file store and the chat-completions generator.
    pub async fn from_config(config: &StoryConfig) -> Result<Self, SessionError> {
        let client = openai::OpenAi::new()?
            .with_base_url(&config.base_url)
            .with_model(&config.model);
        let generator = ChatCompletionGenerator::new(client)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);
        let store = FileStore::new(&config.data_dir);

        let session = Self::open(Arc::new(store), Arc::new(generator)).await?;
        Ok(session.with_env_credential(config.api_key.clone()))
    }

    /// Use a credential from the environment in preference to the stored one.
    pub fn with_env_credential(mut self, credential: Option<String>) -> Self {
        self.env_credential = credential
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }

    /// Generate a story and make it current.
    ///
    /// Every story produced is recorded in history except one written after
    /// the credential was rejected.
    pub async fn generate(&mut self, params: GenerationParameters) -> Result<&Story, SessionError> {
        let credential = self.credential().await?;
        let outcome = self.writer.write(&params, credential.as_deref()).await;

        self.advisory = outcome.advisory().map(str::to_string);
        self.notice = outcome.notice().map(str::to_string);
        let record = !matches!(outcome, GenerationOutcome::Failed { .. });
        let is_fallback = outcome.is_fallback();
        let story = Story::new(params, outcome.into_text(), is_fallback);

        if record {
            self.history.record(story.clone());
            storage::save_history(self.store.as_ref(), &self.history).await?;
        }

        tracing::info!(
            story = %story.id,
            fallback = story.is_fallback,
            recorded = record,
            "Generated story"
        );
        Ok(&*self.current.insert(story))
    }

    /// The credential that generation would use right now.
    pub async fn credential(&self) -> Result<Option<String>, SessionError> {
        if let Some(credential) = &self.env_credential {
            return Ok(Some(credential.clone()));
        }
        Ok(storage::load_credential(self.store.as_ref()).await?)
    }

    /// Store a credential. Blank input is ignored and returns `false`.
    pub async fn set_credential(&mut self, credential: &str) -> Result<bool, SessionError> {
        Ok(storage::save_credential(self.store.as_ref(), credential).await?)
    }

    pub async fn clear_credential(&mut self) -> Result<(), SessionError> {
        Ok(storage::clear_credential(self.store.as_ref()).await?)
    }

    /// Make a saved story current.
    pub fn load_story(&mut self, id: &str) -> Result<&Story, SessionError> {
        let story = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownStory(id.to_string()))?;
        self.advisory = None;
        self.notice = None;
        Ok(&*self.current.insert(story))
    }

    /// Make the newest saved story current.
    pub fn load_latest(&mut self) -> Result<&Story, SessionError> {
        let story = self.history.latest().cloned().ok_or(SessionError::NoStory)?;
        self.advisory = None;
        self.notice = None;
        Ok(&*self.current.insert(story))
    }

    /// Replace the text of the current story. Not saved until [`save_current`].
    ///
    /// [`save_current`]: StorySession::save_current
    pub fn update_content(&mut self, content: impl Into<String>) -> Result<&Story, SessionError> {
        let story = self.current.as_mut().ok_or(SessionError::NoStory)?;
        story.replace_content(content);
        Ok(&*story)
    }

    /// Save the current story into history, replacing its earlier version.
    pub async fn save_current(&mut self) -> Result<(), SessionError> {
        let story = self.current.clone().ok_or(SessionError::NoStory)?;
        tracing::debug!(story = %story.id, "Saving story");
        self.history.save(story);
        storage::save_history(self.store.as_ref(), &self.history).await?;
        Ok(())
    }

    /// Export the current story as a text file into `dir`.
    pub async fn export_current(&self, dir: impl AsRef<Path>) -> Result<PathBuf, SessionError> {
        let story = self.current.as_ref().ok_or(SessionError::NoStory)?;
        let path = story.export_text(dir).await?;
        tracing::info!(path = %path.display(), "Exported story");
        Ok(path)
    }

    pub fn current(&self) -> Option<&Story> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &StoryHistory {
        &self.history
    }

    /// Message about the last generation, if the user needs one.
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn dismiss_advisory(&mut self) {
        self.advisory = None;
    }

    /// Why the current story is a demo one, when that is worth mentioning.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

impl std::fmt::Debug for StorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorySession")
            .field("history", &self.history.len())
            .field("current", &self.current.as_ref().map(|s| &s.id))
            .field("advisory", &self.advisory)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::history::HISTORY_CAPACITY;
    use crate::storage::{MemoryStore, HISTORY_KEY};
    use crate::testing::{sample_params, MockGenerator, TestHarness};

    #[tokio::test]
    async fn test_generate_without_credential_uses_fallback() {
        let mut harness = TestHarness::new().await.unwrap();
        let story = harness.session.generate(sample_params()).await.unwrap();

        assert!(story.is_fallback);
        assert!(story.content.contains("My name is Sam"));
        assert_eq!(harness.generator.call_count(), 0);
        assert_eq!(harness.session.history().len(), 1);
        assert_eq!(harness.session.advisory(), None);
    }

    #[tokio::test]
    async fn test_generated_story_is_recorded_and_persisted() {
        let generator = MockGenerator::new().with_story("A real story.");
        let mut harness = TestHarness::with_generator(generator)
            .await
            .unwrap()
            .with_credential("sk-test")
            .await
            .unwrap();

        let id = harness.session.generate(sample_params()).await.unwrap().id.clone();
        assert!(!harness.session.current().unwrap().is_fallback);

        let raw = harness.store.get(HISTORY_KEY).await.unwrap().unwrap();
        assert!(raw.contains(&id));
        assert!(raw.contains("A real story."));
    }

    #[tokio::test]
    async fn test_rejected_credential_is_advised_and_not_recorded() {
        let generator = MockGenerator::new().with_error(GenerationError::Unauthenticated);
        let mut harness = TestHarness::with_generator(generator)
            .await
            .unwrap()
            .with_credential("sk-bad")
            .await
            .unwrap();

        let story = harness.session.generate(sample_params()).await.unwrap();
        assert!(story.is_fallback);
        assert!(harness
            .session
            .advisory()
            .unwrap()
            .starts_with("Invalid API key"));
        assert!(harness.session.history().is_empty());
        assert!(harness.session.current().is_some());
    }

    #[tokio::test]
    async fn test_rate_limited_story_is_recorded() {
        let generator = MockGenerator::new().with_error(GenerationError::RateLimited);
        let mut harness = TestHarness::with_generator(generator)
            .await
            .unwrap()
            .with_credential("sk-test")
            .await
            .unwrap();

        harness.session.generate(sample_params()).await.unwrap();
        assert!(harness.session.current().unwrap().is_fallback);
        assert_eq!(harness.session.history().len(), 1);
        assert_eq!(harness.session.advisory(), None);
        assert!(harness
            .session
            .notice()
            .unwrap()
            .starts_with("API rate limit reached"));
    }

    #[tokio::test]
    async fn test_env_credential_overrides_stored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let generator = Arc::new(MockGenerator::new());
        let mut session = StorySession::open(store, generator.clone())
            .await
            .unwrap()
            .with_env_credential(Some(" sk-env ".to_string()));

        session.set_credential("sk-stored").await.unwrap();
        assert_eq!(session.credential().await.unwrap().as_deref(), Some("sk-env"));

        session.generate(sample_params()).await.unwrap();
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_credential_returns_to_fallback() {
        let mut harness = TestHarness::new()
            .await
            .unwrap()
            .with_credential("sk-test")
            .await
            .unwrap();
        harness.session.clear_credential().await.unwrap();

        harness.session.generate(sample_params()).await.unwrap();
        assert_eq!(harness.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_and_save_replaces_in_place() {
        let mut harness = TestHarness::new().await.unwrap();
        let first = harness.session.generate(sample_params()).await.unwrap().id.clone();
        harness.session.generate(sample_params()).await.unwrap();

        harness.session.load_story(&first).unwrap();
        harness.session.update_content("Edited.\n\nThe end.").unwrap();
        harness.session.save_current().await.unwrap();

        let history = harness.session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.as_slice()[1].id, first);
        assert_eq!(history.as_slice()[1].content, "Edited.\n\nThe end.");
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let mut harness = TestHarness::new().await.unwrap();
        for _ in 0..HISTORY_CAPACITY + 2 {
            harness.session.generate(sample_params()).await.unwrap();
        }
        assert_eq!(harness.session.history().len(), HISTORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_no_story_errors() {
        let mut harness = TestHarness::new().await.unwrap();
        assert!(matches!(
            harness.session.update_content("x"),
            Err(SessionError::NoStory)
        ));
        assert!(matches!(
            harness.session.save_current().await,
            Err(SessionError::NoStory)
        ));
        assert!(matches!(
            harness.session.load_story("missing"),
            Err(SessionError::UnknownStory(_))
        ));
        assert!(matches!(
            harness.session.load_latest(),
            Err(SessionError::NoStory)
        ));
    }

    #[tokio::test]
    async fn test_reopen_restores_history() {
        let mut harness = TestHarness::new().await.unwrap();
        harness.session.generate(sample_params()).await.unwrap();

        let reopened = StorySession::open(harness.store.clone(), harness.generator.clone())
            .await
            .unwrap();
        assert_eq!(reopened.history(), harness.session.history());
    }
}
