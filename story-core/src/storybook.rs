//! Storybook playback: paging through a story while it is read aloud.
//!
//! [`Storybook`] is a synchronous state machine. The front end feeds it user
//! actions and two kinds of internal events: narration completions (by
//! utterance id) and the firing of a scheduled auto-advance (by token). Events
//! carrying an id or token the storybook is no longer waiting for are ignored,
//! which is what makes late completions after a pause, mute or page change
//! harmless.

use crate::images::{placeholder_images, Illustration};
use crate::narration::{Narrator, SpeechParams, Utterance, UtteranceId};
use crate::story::Story;
use std::time::Duration;

/// Pause between the end of a page's narration and turning the page.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(500);

/// Identifies one scheduled auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdvanceToken(u64);

/// A request to call [`Storybook::complete_scheduled_advance`] after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub token: AdvanceToken,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to show: no story, or a story without pages.
    Idle,
    Loaded,
}

/// What the front end renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub page_index: usize,
    pub playing: bool,
    pub muted: bool,
}

pub struct Storybook<N: Narrator> {
    narrator: N,
    speech: SpeechParams,
    pages: Vec<String>,
    illustrations: Vec<Illustration>,
    state: PlaybackState,
    /// The utterance whose completion we are waiting for.
    speaking: Option<UtteranceId>,
    pending_advance: Option<AdvanceToken>,
    next_utterance: u64,
    next_token: u64,
}

impl<N: Narrator> Storybook<N> {
    pub fn new(narrator: N) -> Self {
        Self {
            narrator,
            speech: SpeechParams::default(),
            pages: Vec::new(),
            illustrations: Vec::new(),
            state: PlaybackState::default(),
            speaking: None,
            pending_advance: None,
            next_utterance: 0,
            next_token: 0,
        }
    }

    pub fn with_speech_params(mut self, speech: SpeechParams) -> Self {
        self.speech = speech;
        self
    }

    /// Show a story from its first page, paused and unmuted.
    pub fn load(&mut self, story: &Story) {
        self.narrator.cancel();
        self.speaking = None;
        self.pending_advance = None;

        self.pages = story.pages();
        self.illustrations = placeholder_images(
            &story.params.scenario,
            self.pages.len(),
            story.created_at.timestamp_millis(),
        );
        self.state = PlaybackState::default();

        tracing::debug!(story = %story.id, pages = self.pages.len(), "Loaded storybook");
    }

    /// Drop the current story.
    pub fn clear(&mut self) {
        self.narrator.cancel();
        self.speaking = None;
        self.pending_advance = None;
        self.pages.clear();
        self.illustrations.clear();
        self.state = PlaybackState::default();
    }

    pub fn toggle_play(&mut self) {
        if self.state.playing {
            self.state.playing = false;
            self.pending_advance = None;
            self.stop_speaking();
            tracing::debug!(page = self.state.page_index, "Paused");
        } else if self.phase() == Phase::Loaded {
            self.state.playing = true;
            self.speak_current();
            tracing::debug!(page = self.state.page_index, "Playing");
        }
    }

    /// Go to the next page. On the last page this stops playback instead.
    pub fn advance(&mut self) {
        self.pending_advance = None;
        self.stop_speaking();

        if self.can_advance() {
            self.state.page_index += 1;
            if self.state.playing {
                self.speak_current();
            }
        } else {
            self.state.playing = false;
        }
    }

    /// Go to the previous page. Does nothing on the first page.
    pub fn retreat(&mut self) {
        if !self.can_retreat() {
            return;
        }

        self.pending_advance = None;
        self.stop_speaking();
        self.state.page_index -= 1;
        if self.state.playing {
            self.speak_current();
        }
    }

    /// Jump to `index`, clamped to the last page.
    pub fn go_to_page(&mut self, index: usize) {
        if self.pages.is_empty() {
            return;
        }
        self.pending_advance = None;
        self.stop_speaking();
        self.state.page_index = index.min(self.pages.len() - 1);
        if self.state.playing {
            self.speak_current();
        }
    }

    pub fn toggle_mute(&mut self) {
        self.state.muted = !self.state.muted;
        self.pending_advance = None;
        if self.state.muted {
            self.stop_speaking();
        } else if self.state.playing {
            self.speak_current();
        }
    }

    /// Narration of `id` ran to the end.
    ///
    /// Returns the auto-advance the caller should schedule, if any.
    pub fn narration_finished(&mut self, id: UtteranceId) -> Option<ScheduledAdvance> {
        if self.speaking != Some(id) {
            tracing::debug!(?id, "Ignoring stale narration completion");
            return None;
        }
        self.speaking = None;

        if !self.state.playing {
            return None;
        }

        if !self.can_advance() {
            self.state.playing = false;
            return None;
        }

        let token = AdvanceToken(self.next_token);
        self.next_token += 1;
        self.pending_advance = Some(token);

        Some(ScheduledAdvance {
            token,
            delay: AUTO_ADVANCE_DELAY,
        })
    }

    /// A scheduled auto-advance fired. Returns whether the page turned.
    pub fn complete_scheduled_advance(&mut self, token: AdvanceToken) -> bool {
        if self.pending_advance != Some(token) {
            return false;
        }
        self.pending_advance = None;

        if !self.state.playing || !self.can_advance() {
            return false;
        }

        self.state.page_index += 1;
        self.speak_current();
        true
    }

    pub fn phase(&self) -> Phase {
        if self.pages.is_empty() {
            Phase::Idle
        } else {
            Phase::Loaded
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> Option<&str> {
        self.pages.get(self.state.page_index).map(String::as_str)
    }

    pub fn current_illustration(&self) -> Option<&Illustration> {
        self.illustrations.get(self.state.page_index)
    }

    /// "Page N of M", or `None` when idle.
    pub fn page_label(&self) -> Option<String> {
        match self.phase() {
            Phase::Idle => None,
            Phase::Loaded => Some(format!(
                "Page {} of {}",
                self.state.page_index + 1,
                self.pages.len()
            )),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.state.page_index + 1 < self.pages.len()
    }

    pub fn can_retreat(&self) -> bool {
        self.state.page_index > 0
    }

    pub fn narration_supported(&self) -> bool {
        self.narrator.is_available()
    }

    /// Whether an auto-advance is scheduled.
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    fn speak_current(&mut self) {
        if self.state.muted || !self.narrator.is_available() {
            return;
        }
        let Some(text) = self.pages.get(self.state.page_index).cloned() else {
            return;
        };

        self.stop_speaking();

        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;
        let started = self.narrator.speak(Utterance {
            id,
            text,
            params: self.speech,
        });
        self.speaking = started.then_some(id);
    }

    fn stop_speaking(&mut self) {
        if self.speaking.take().is_some() {
            self.narrator.cancel();
        }
    }
}

impl<N: Narrator> std::fmt::Debug for Storybook<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storybook")
            .field("pages", &self.pages.len())
            .field("state", &self.state)
            .field("speaking", &self.speaking)
            .field("pending_advance", &self.pending_advance)
            .finish()
    }
}
