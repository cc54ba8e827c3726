//! Social story generation with a narrated storybook.
//!
//! This crate provides:
//! - Prompt construction and remote generation through an OpenAI-compatible API
//! - Deterministic fallback stories when remote generation is unavailable
//! - A bounded story history persisted through a key-value store
//! - A storybook playback controller that pages through a story while it is
//!   read aloud
//!
//! # Quick Start
//!
//! ```ignore
//! use story_core::{GenerationParameters, LanguageLevel, StoryConfig, StorySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryConfig::from_env();
//!     let mut session = StorySession::from_config(&config).await?;
//!
//!     let params = GenerationParameters::new("school", 5, LanguageLevel::Simple)
//!         .with_child_name("Sam");
//!     let story = session.generate(params).await?;
//!     println!("{}", story.content);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod fallback;
pub mod generation;
pub mod headless;
pub mod history;
pub mod images;
pub mod narration;
pub mod params;
pub mod prompt;
pub mod session;
pub mod storage;
pub mod story;
pub mod storybook;
pub mod testing;

// Primary public API
pub use config::StoryConfig;
pub use fallback::fallback_story;
pub use generation::{
    ChatCompletionGenerator, FallbackReason, GenerationError, GenerationOutcome, StoryGenerator,
    StoryWriter,
};
pub use headless::{HeadlessConfig, HeadlessStory};
pub use history::{StoryHistory, HISTORY_CAPACITY};
pub use images::{placeholder_images, visual_prompts, Illustration};
pub use narration::{CommandNarrator, Narrator, SilentNarrator, SpeechParams, Utterance, UtteranceId};
pub use params::{GenerationParameters, LanguageLevel, ParamsError, Scenario};
pub use prompt::build_prompt;
pub use session::{SessionError, StorySession};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use story::{split_pages, Story};
pub use storybook::{AdvanceToken, Phase, PlaybackState, ScheduledAdvance, Storybook};
pub use testing::{MockGenerator, RecordingNarrator, TestHarness};
