//! Status and hotkey bars

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use story_core::PlaybackState;

use crate::app::InputMode;
use crate::ui::theme::StoryTheme;

/// Playback state and the latest status message
pub struct StatusBarWidget<'a> {
    playback: PlaybackState,
    narration_supported: bool,
    is_demo: bool,
    notice: Option<&'a str>,
    message: Option<&'a str>,
    theme: &'a StoryTheme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(playback: PlaybackState, theme: &'a StoryTheme) -> Self {
        Self {
            playback,
            narration_supported: true,
            is_demo: false,
            notice: None,
            message: None,
            theme,
        }
    }

    pub fn narration_supported(mut self, supported: bool) -> Self {
        self.narration_supported = supported;
        self
    }

    pub fn demo(mut self, is_demo: bool) -> Self {
        self.is_demo = is_demo;
        self
    }

    /// Why the story is a demo one
    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));
        let inner = block.inner(area);
        block.render(area, buf);

        let playback = if self.playback.playing { "▶ Playing" } else { "⏸ Paused" };
        let sound = if self.playback.muted { "Muted" } else { "Sound on" };

        let mut spans = vec![
            Span::styled(
                playback,
                self.theme
                    .playback_style(self.playback.playing, self.playback.muted),
            ),
            Span::raw(" | "),
            Span::styled(
                sound,
                self.theme
                    .playback_style(self.playback.playing, self.playback.muted),
            ),
        ];

        if !self.narration_supported {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("No narration", self.theme.system_style()));
        }
        if self.is_demo {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("Demo story", self.theme.demo_style()));
            if let Some(notice) = self.notice {
                spans.push(Span::styled(format!(" ({notice})"), self.theme.demo_style()));
            }
        }
        if let Some(message) = self.message {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(message, Style::default().fg(self.theme.foreground)));
        }

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}

/// Keys available in the current input mode
pub struct HotkeyBarWidget<'a> {
    input_mode: InputMode,
    theme: &'a StoryTheme,
}

impl<'a> HotkeyBarWidget<'a> {
    pub fn new(input_mode: InputMode, theme: &'a StoryTheme) -> Self {
        Self { input_mode, theme }
    }

    fn hotkeys(&self) -> &'static [(&'static str, &'static str)] {
        match self.input_mode {
            InputMode::Normal => &[
                ("Space", "play"),
                ("←/→", "page"),
                ("m", "mute"),
                ("r", "new"),
                ("c", "context"),
                ("e", "edit"),
                ("s", "save"),
                ("x", "export"),
                ("H", "history"),
                ("?", "help"),
                ("q", "quit"),
            ],
            InputMode::Context | InputMode::ApiKey | InputMode::EditPage => {
                &[("Enter", "submit"), ("Esc", "cancel")]
            }
        }
    }
}

impl Widget for HotkeyBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_style = self.theme.title_style();
        let desc_style = Style::default().add_modifier(Modifier::DIM);

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hotkeys().iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::styled(format!(" {desc}"), desc_style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
