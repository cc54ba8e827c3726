//! Single-line input widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::StoryTheme;

/// Input line for context, API keys and page edits
pub struct InputWidget<'a> {
    content: &'a str,
    prompt: &'a str,
    theme: &'a StoryTheme,
    masked: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a StoryTheme) -> Self {
        Self {
            content,
            prompt: "> ",
            theme,
            masked: false,
        }
    }

    pub fn prompt(mut self, prompt: &'a str) -> Self {
        self.prompt = prompt;
        self
    }

    /// Hide what is typed, for secrets.
    pub fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let shown = if self.masked {
            "•".repeat(self.content.chars().count())
        } else {
            self.content.to_string()
        };

        // Keep the end of long input visible
        let width = inner.width.saturating_sub(self.prompt.chars().count() as u16 + 1) as usize;
        let char_count = shown.chars().count();
        let visible: String = shown.chars().skip(char_count.saturating_sub(width)).collect();

        let line = Line::from(vec![
            Span::styled(self.prompt, self.theme.input_style()),
            Span::raw(visible),
            Span::styled(
                " ",
                Style::default()
                    .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                    .fg(self.theme.input_text),
            ),
        ]);

        Paragraph::new(line).render(inner, buf);
    }
}
