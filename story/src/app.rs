//! Main application state and logic

use std::path::PathBuf;
use std::time::Instant;

use story_core::headless::HeadlessConfig;
use story_core::storage::mask_credential;
use story_core::story::join_pages;
use story_core::{
    visual_prompts, AdvanceToken, GenerationParameters, Narrator, Story, StorySession, Storybook,
    UtteranceId,
};
use tokio::sync::mpsc;

use crate::ui::theme::StoryTheme;
use crate::ui::Overlay;

/// What the single-line input is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Storybook controls (default)
    #[default]
    Normal,
    /// Additional context for a new story
    Context,
    /// An API key to store
    ApiKey,
    /// New text for the current page
    EditPage,
}

/// Session work the event loop runs between frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Generate,
    OpenLatest,
    Open(String),
    Save,
    Export(PathBuf),
    SetKey(String),
    ClearKey,
}

impl Action {
    /// Status shown while the action runs.
    pub fn progress_message(&self) -> &'static str {
        match self {
            Action::Generate => "Writing a new story...",
            Action::OpenLatest | Action::Open(_) => "Opening story...",
            Action::Save => "Saving...",
            Action::Export(_) => "Exporting...",
            Action::SetKey(_) | Action::ClearKey => "Updating API key...",
        }
    }
}

/// Main application state
pub struct App {
    pub session: StorySession,
    pub storybook: Storybook<Box<dyn Narrator>>,
    finished_rx: mpsc::UnboundedReceiver<UtteranceId>,
    scheduled_advance: Option<(AdvanceToken, Instant)>,

    /// Parameters for the next generation
    pub params: GenerationParameters,
    open_latest: bool,

    // UI state
    pub theme: StoryTheme,
    overlay: Option<Overlay>,

    // Input state
    pub input_mode: InputMode,
    input_buffer: String,

    // Status
    status_message: Option<String>,
    pending: Option<Action>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        session: StorySession,
        narrator: Box<dyn Narrator>,
        finished_rx: mpsc::UnboundedReceiver<UtteranceId>,
        config: HeadlessConfig,
    ) -> Self {
        Self {
            session,
            storybook: Storybook::new(narrator),
            finished_rx,
            scheduled_advance: None,
            params: config.params,
            open_latest: config.open_latest,
            theme: StoryTheme::default(),
            overlay: None,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            status_message: None,
            pending: None,
            should_quit: false,
        }
    }

    /// Queue the first story: the latest saved one if asked for, else a new one.
    pub fn start(&mut self) {
        if self.open_latest && !self.session.history().is_empty() {
            self.pending = Some(Action::OpenLatest);
        } else {
            self.pending = Some(Action::Generate);
        }
    }

    pub fn request(&mut self, action: Action) {
        self.pending = Some(action);
    }

    pub fn take_pending(&mut self) -> Option<Action> {
        self.pending.take()
    }

    /// Run a session action and report the result in the status bar.
    pub async fn run_action(&mut self, action: Action) {
        let changes_story = matches!(
            action,
            Action::Generate | Action::OpenLatest | Action::Open(_)
        );

        let result = match action {
            Action::Generate => self
                .session
                .generate(self.params.clone())
                .await
                .map(|story| format!("New {}", story.title())),
            Action::OpenLatest => self
                .session
                .load_latest()
                .map(|story| format!("Opened {}", story.title())),
            Action::Open(id) => self
                .session
                .load_story(&id)
                .map(|story| format!("Opened {}", story.title())),
            Action::Save => self
                .session
                .save_current()
                .await
                .map(|()| "Story saved".to_string()),
            Action::Export(dir) => self
                .session
                .export_current(dir)
                .await
                .map(|path| format!("Exported to {}", path.display())),
            Action::SetKey(key) => self.session.set_credential(&key).await.map(|stored| {
                if stored {
                    format!("API key saved {}", mask_credential())
                } else {
                    "API key is blank, nothing saved".to_string()
                }
            }),
            Action::ClearKey => self
                .session
                .clear_credential()
                .await
                .map(|()| "API key removed, demo stories from now on".to_string()),
        };

        match result {
            Ok(message) => {
                if changes_story {
                    self.show_current_story();
                }
                let message = match self.session.advisory() {
                    Some(advisory) if changes_story => advisory.to_string(),
                    _ => message,
                };
                self.set_status(message);
            }
            Err(e) => {
                tracing::error!(error = %e, "Action failed");
                self.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Show the session's current story from its first page.
    fn show_current_story(&mut self) {
        if let Some(story) = self.session.current() {
            self.storybook.load(story);
        }
        self.scheduled_advance = None;
    }

    /// Forget the timer when the storybook no longer waits for it.
    fn sync_schedule(&mut self) {
        if !self.storybook.has_pending_advance() {
            self.scheduled_advance = None;
        }
    }

    /// Feed finished narrations to the storybook.
    pub fn drain_narration(&mut self) {
        while let Ok(id) = self.finished_rx.try_recv() {
            if let Some(scheduled) = self.storybook.narration_finished(id) {
                self.scheduled_advance = Some((scheduled.token, Instant::now() + scheduled.delay));
            }
        }
    }

    /// Fire the scheduled auto-advance once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some((token, deadline)) = self.scheduled_advance {
            if now >= deadline {
                self.scheduled_advance = None;
                self.storybook.complete_scheduled_advance(token);
            }
        }
    }

    pub fn toggle_play(&mut self) {
        self.storybook.toggle_play();
        self.sync_schedule();
        if self.storybook.state().playing && !self.storybook.narration_supported() {
            self.set_status("Narration unavailable, set SOCIAL_STORY_TTS to a speech program");
        }
    }

    pub fn next_page(&mut self) {
        self.storybook.advance();
        self.sync_schedule();
    }

    pub fn previous_page(&mut self) {
        self.storybook.retreat();
        self.sync_schedule();
    }

    pub fn toggle_mute(&mut self) {
        self.storybook.toggle_mute();
        self.sync_schedule();
    }

    pub fn current_story(&self) -> Option<&Story> {
        self.session.current()
    }

    /// Illustration prompts for the current story.
    pub fn visual_prompts(&self) -> Vec<&'static str> {
        self.current_story()
            .map(|story| visual_prompts(&story.params))
            .unwrap_or_default()
    }

    // Input line

    pub fn begin_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input_buffer.clear();
        match mode {
            InputMode::Context => {
                if let Some(context) = self.params.context() {
                    self.input_buffer = context.to_string();
                }
            }
            InputMode::EditPage => {
                if let Some(page) = self.storybook.current_page() {
                    self.input_buffer = page.replace('\n', " ");
                }
            }
            InputMode::Normal | InputMode::ApiKey => {}
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn insert_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn delete_char(&mut self) {
        self.input_buffer.pop();
    }

    /// Finish the input line and queue what it was for.
    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input_buffer);
        match self.input_mode {
            InputMode::Context => {
                self.params = self.params.clone().with_context(text);
                self.request(Action::Generate);
            }
            InputMode::ApiKey => self.request(Action::SetKey(text)),
            InputMode::EditPage => self.replace_current_page(&text),
            InputMode::Normal => {}
        }
        self.input_mode = InputMode::Normal;
    }

    /// Replace the text of the page being shown. A blank page is removed.
    fn replace_current_page(&mut self, text: &str) {
        let index = self.storybook.state().page_index;
        let mut pages = self.storybook.pages().to_vec();
        if index >= pages.len() {
            return;
        }
        if text.trim().is_empty() {
            pages.remove(index);
        } else {
            pages[index] = text.trim().to_string();
        }

        if let Err(e) = self.session.update_content(join_pages(&pages)) {
            self.set_status(format!("Error: {e}"));
            return;
        }
        self.show_current_story();
        self.storybook.go_to_page(index);
        self.set_status("Page edited, press s to save");
    }

    // Overlays

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            _ => Some(Overlay::Help),
        };
    }

    pub fn show_history(&mut self) {
        self.overlay = Some(Overlay::History { selected: 0 });
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn move_history_selection(&mut self, delta: isize) {
        let len = self.session.history().len();
        if let Some(Overlay::History { selected }) = &mut self.overlay {
            if len == 0 {
                *selected = 0;
            } else {
                *selected = selected.saturating_add_signed(delta).min(len - 1);
            }
        }
    }

    /// Open the story selected in the history overlay.
    pub fn open_selected_history(&mut self) {
        if let Some(Overlay::History { selected }) = self.overlay {
            if let Some(story) = self.session.history().as_slice().get(selected) {
                let id = story.id.clone();
                self.request(Action::Open(id));
            }
        }
        self.overlay = None;
    }

    // Status

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
