//! Color theme and styling for the storybook TUI

use ratatui::style::{Color, Modifier, Style};

/// Storybook color theme
#[derive(Debug, Clone)]
pub struct StoryTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub title_text: Color,
    pub page_text: Color,
    pub caption_text: Color,
    pub input_text: Color,
    pub system_text: Color,

    // Playback indicators
    pub playing: Color,
    pub paused: Color,
    pub muted: Color,
    pub demo: Color,
}

impl Default for StoryTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::LightMagenta,

            title_text: Color::LightMagenta,
            page_text: Color::White,
            caption_text: Color::Gray,
            input_text: Color::Cyan,
            system_text: Color::DarkGray,

            playing: Color::LightGreen,
            paused: Color::Yellow,
            muted: Color::LightRed,
            demo: Color::LightBlue,
        }
    }
}

impl StoryTheme {
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Story text, slightly larger in spirit than everything else
    pub fn page_style(&self) -> Style {
        Style::default().fg(self.page_text)
    }

    pub fn caption_style(&self) -> Style {
        Style::default()
            .fg(self.caption_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn input_style(&self) -> Style {
        Style::default().fg(self.input_text)
    }

    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Style for the play/pause indicator
    pub fn playback_style(&self, playing: bool, muted: bool) -> Style {
        let color = if muted {
            self.muted
        } else if playing {
            self.playing
        } else {
            self.paused
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn demo_style(&self) -> Style {
        Style::default().fg(self.demo)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
