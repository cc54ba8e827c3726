//! Storybook page widget

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use story_core::Illustration;

use crate::ui::theme::StoryTheme;

/// One page of the storybook: the illustration caption above the text.
pub struct PageWidget<'a> {
    text: Option<&'a str>,
    illustration: Option<&'a Illustration>,
    label: Option<String>,
    theme: &'a StoryTheme,
    placeholder: &'a str,
}

impl<'a> PageWidget<'a> {
    pub fn new(text: Option<&'a str>, theme: &'a StoryTheme) -> Self {
        Self {
            text,
            illustration: None,
            label: None,
            theme,
            placeholder: "No story yet",
        }
    }

    pub fn illustration(mut self, illustration: Option<&'a Illustration>) -> Self {
        self.illustration = illustration;
        self
    }

    pub fn label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for PageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match &self.label {
            Some(label) => format!(" {label} "),
            None => " Story ".to_string(),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.text.is_some()));

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(text) = self.text else {
            Paragraph::new(Line::from(Span::styled(
                self.placeholder,
                Style::default().add_modifier(Modifier::DIM),
            )))
            .render(inner, buf);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(inner);

        if let Some(illustration) = self.illustration {
            let caption = vec![
                Line::from(Span::styled(
                    format!("[{}]", illustration.alt),
                    self.theme.caption_style(),
                )),
                Line::from(Span::styled(
                    illustration.url.as_str(),
                    self.theme.system_style(),
                )),
            ];
            Paragraph::new(caption)
                .wrap(Wrap { trim: true })
                .render(chunks[0], buf);
        }

        let lines: Vec<Line> = text
            .lines()
            .map(|line| Line::from(Span::styled(line, self.theme.page_style())))
            .collect();

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(chunks[1], buf);
    }
}
