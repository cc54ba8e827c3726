//! Headless storybook interface for programmatic use.
//!
//! This module drives a [`StorySession`] and a [`Storybook`] together without
//! a terminal UI. It's designed for:
//! - Automated testing of the generate, read, edit and save flow
//! - Script-driven sessions over a line protocol
//!
//! # Example
//!
//! ```ignore
//! use story_core::headless::{HeadlessConfig, HeadlessStory};
//! use story_core::{GenerationParameters, SilentNarrator, StoryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HeadlessConfig::new(GenerationParameters::default());
//!     let mut book = HeadlessStory::from_config(&StoryConfig::from_env(), config, SilentNarrator).await?;
//!
//!     println!("{}", book.page_text().unwrap_or_default());
//!     book.next();
//!     println!("{}", book.page_label().unwrap_or_default());
//!     Ok(())
//! }
//! ```

use crate::config::StoryConfig;
use crate::history::StoryHistory;
use crate::narration::{Narrator, UtteranceId};
use crate::params::GenerationParameters;
use crate::session::{SessionError, StorySession};
use crate::story::Story;
use crate::storybook::{PlaybackState, ScheduledAdvance, Storybook};
use std::path::{Path, PathBuf};

/// Configuration for a headless session.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Parameters for the first story and for regeneration.
    pub params: GenerationParameters,

    /// Open the newest saved story instead of generating one, when there is one.
    pub open_latest: bool,
}

impl HeadlessConfig {
    pub fn new(params: GenerationParameters) -> Self {
        Self {
            params,
            open_latest: false,
        }
    }

    pub fn with_open_latest(mut self, open_latest: bool) -> Self {
        self.open_latest = open_latest;
        self
    }
}

/// A story session with a storybook attached.
pub struct HeadlessStory<N: Narrator> {
    session: StorySession,
    book: Storybook<N>,
    params: GenerationParameters,
}

impl<N: Narrator> HeadlessStory<N> {
    /// Open the session described by `story_config` and show the first story.
    pub async fn from_config(
        story_config: &StoryConfig,
        config: HeadlessConfig,
        narrator: N,
    ) -> Result<Self, SessionError> {
        let session = StorySession::from_config(story_config).await?;
        Self::new(session, config, narrator).await
    }

    /// Show the first story from an already opened session.
    pub async fn new(
        session: StorySession,
        config: HeadlessConfig,
        narrator: N,
    ) -> Result<Self, SessionError> {
        let mut headless = Self {
            session,
            book: Storybook::new(narrator),
            params: config.params,
        };

        if config.open_latest && !headless.session.history().is_empty() {
            headless.session.load_latest()?;
            headless.reload_book();
        } else {
            headless.generate().await?;
        }
        Ok(headless)
    }

    /// Generate a new story from the configured parameters.
    pub async fn generate(&mut self) -> Result<&Story, SessionError> {
        self.session.generate(self.params.clone()).await?;
        self.reload_book();
        self.session.current().ok_or(SessionError::NoStory)
    }

    /// Generate a new story with different additional context.
    pub async fn regenerate_with_context(&mut self, context: &str) -> Result<&Story, SessionError> {
        self.params = self.params.clone().with_context(context);
        self.generate().await
    }

    pub fn open(&mut self, id: &str) -> Result<&Story, SessionError> {
        self.session.load_story(id)?;
        self.reload_book();
        self.session.current().ok_or(SessionError::NoStory)
    }

    /// Replace the current story's text and start again from the first page.
    pub fn edit(&mut self, content: impl Into<String>) -> Result<&Story, SessionError> {
        self.session.update_content(content)?;
        self.reload_book();
        self.session.current().ok_or(SessionError::NoStory)
    }

    pub async fn save(&mut self) -> Result<(), SessionError> {
        self.session.save_current().await
    }

    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf, SessionError> {
        self.session.export_current(dir).await
    }

    pub async fn set_credential(&mut self, credential: &str) -> Result<bool, SessionError> {
        self.session.set_credential(credential).await
    }

    pub async fn clear_credential(&mut self) -> Result<(), SessionError> {
        self.session.clear_credential().await
    }

    pub fn next(&mut self) {
        self.book.advance();
    }

    pub fn prev(&mut self) {
        self.book.retreat();
    }

    pub fn toggle_play(&mut self) {
        self.book.toggle_play();
    }

    pub fn toggle_mute(&mut self) {
        self.book.toggle_mute();
    }

    pub fn narration_finished(&mut self, id: UtteranceId) -> Option<ScheduledAdvance> {
        self.book.narration_finished(id)
    }

    pub fn page_text(&self) -> Option<&str> {
        self.book.current_page()
    }

    pub fn page_label(&self) -> Option<String> {
        self.book.page_label()
    }

    pub fn playback(&self) -> PlaybackState {
        self.book.state()
    }

    pub fn story(&self) -> Option<&Story> {
        self.session.current()
    }

    pub fn history(&self) -> &StoryHistory {
        self.session.history()
    }

    pub fn advisory(&self) -> Option<&str> {
        self.session.advisory()
    }

    pub fn notice(&self) -> Option<&str> {
        self.session.notice()
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn storybook(&self) -> &Storybook<N> {
        &self.book
    }

    fn reload_book(&mut self) {
        match self.session.current() {
            Some(story) => self.book.load(story),
            None => self.book.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_params, RecordingNarrator, TestHarness};

    async fn headless(config: HeadlessConfig) -> HeadlessStory<RecordingNarrator> {
        let harness = TestHarness::new().await.unwrap();
        HeadlessStory::new(harness.session, config, RecordingNarrator::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_starts_on_first_page_of_new_story() {
        let book = headless(HeadlessConfig::new(sample_params())).await;
        assert_eq!(book.page_text(), Some("My School Day"));
        assert_eq!(book.history().len(), 1);
        assert!(!book.playback().playing);
    }

    #[tokio::test]
    async fn test_navigation() {
        let mut book = headless(HeadlessConfig::new(sample_params())).await;
        book.prev();
        assert_eq!(book.playback().page_index, 0);

        book.next();
        assert!(book.page_text().unwrap().starts_with("My name is Sam."));
        assert_eq!(
            book.page_label().unwrap(),
            format!("Page 2 of {}", book.storybook().page_count())
        );
    }

    #[tokio::test]
    async fn test_edit_reloads_pages() {
        let mut book = headless(HeadlessConfig::new(sample_params())).await;
        book.next();
        book.edit("One.\n\nTwo.").unwrap();

        assert_eq!(book.storybook().page_count(), 2);
        assert_eq!(book.page_text(), Some("One."));

        book.save().await.unwrap();
        assert_eq!(book.history().latest().unwrap().content, "One.\n\nTwo.");
    }

    #[tokio::test]
    async fn test_regenerate_with_context() {
        let mut book = headless(HeadlessConfig::new(sample_params())).await;
        book.regenerate_with_context("we have a fire drill").await.unwrap();

        assert_eq!(book.params().context(), Some("we have a fire drill"));
        assert!(book
            .story()
            .unwrap()
            .content
            .contains("We have a fire drill. I can handle this."));
        assert_eq!(book.history().len(), 2);
    }

    #[tokio::test]
    async fn test_open_latest() {
        let harness = TestHarness::new().await.unwrap();
        let mut session = harness.session;
        session.generate(sample_params()).await.unwrap();
        let id = session.current().unwrap().id.clone();

        let book = HeadlessStory::new(
            session,
            HeadlessConfig::new(sample_params()).with_open_latest(true),
            RecordingNarrator::new(),
        )
        .await
        .unwrap();

        assert_eq!(book.story().unwrap().id, id);
        assert_eq!(book.history().len(), 1);
    }
}
