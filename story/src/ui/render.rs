//! Render orchestration for the storybook TUI

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::ui::layout::{centered_rect_fixed, StoryLayout};
use crate::ui::widgets::{HotkeyBarWidget, InputWidget, PageWidget, StatusBarWidget};

/// Overlay types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
    History { selected: usize },
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = StoryLayout::calculate(area, app.input_mode != InputMode::Normal);

    render_title_bar(frame, app, layout.title_area);

    let book = &app.storybook;
    let page_widget = PageWidget::new(book.current_page(), &app.theme)
        .illustration(book.current_illustration())
        .label(book.page_label())
        .placeholder("Writing your story...");
    frame.render_widget(page_widget, layout.page_area);

    if app.input_mode != InputMode::Normal {
        render_input(frame, app, layout.input_area);
    }

    let status_widget = StatusBarWidget::new(book.state(), &app.theme)
        .narration_supported(book.narration_supported())
        .demo(app.current_story().is_some_and(|story| story.is_fallback))
        .notice(app.session.notice())
        .message(app.status_message());
    frame.render_widget(status_widget, layout.status_bar);

    frame.render_widget(
        HotkeyBarWidget::new(app.input_mode, &app.theme),
        layout.hotkey_bar,
    );

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.current_story() {
        Some(story) => vec![
            Line::from(Span::styled(format!(" {} ", story.title()), app.theme.title_style())),
            Line::from(Span::styled(
                format!(" {}", story.subtitle().unwrap_or_default()),
                app.theme.caption_style(),
            )),
        ],
        None => vec![Line::from(Span::styled(" Social Story ", app.theme.title_style()))],
    };
    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the input area
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let prompt = match app.input_mode {
        InputMode::Context => "Context: ",
        InputMode::ApiKey => "API key: ",
        InputMode::EditPage => "Page: ",
        InputMode::Normal => "> ",
    };

    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .prompt(prompt)
        .masked(app.input_mode == InputMode::ApiKey);
    frame.render_widget(input_widget, area);
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
        Overlay::History { selected } => render_history_overlay(frame, app, *selected, area),
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::UNDERLINED),
    ))
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(60, 28, area);
    frame.render_widget(Clear, popup_area);

    let mut help_text = vec![
        Line::from(Span::styled(
            " Social Story - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Reading:"),
        Line::from("  Space          Play / pause narration"),
        Line::from("  ←/h  →/l       Previous / next page"),
        Line::from("  m              Mute / unmute"),
        Line::from(""),
        section("Stories:"),
        Line::from("  r              New story"),
        Line::from("  c              New story with different context"),
        Line::from("  e              Edit the current page"),
        Line::from("  s              Save to history"),
        Line::from("  x              Export as text to the current directory"),
        Line::from("  H              Story history"),
        Line::from(""),
        section("API key:"),
        Line::from("  k              Enter an OpenAI API key"),
        Line::from("  K              Remove the saved key"),
        Line::from(""),
        Line::from("  ?              Toggle this help"),
        Line::from("  q / Ctrl+C     Quit"),
    ];

    let prompts = app.visual_prompts();
    if !prompts.is_empty() {
        help_text.push(Line::from(""));
        help_text.push(section("Illustration ideas:"));
        for prompt in prompts {
            help_text.push(Line::from(Span::styled(
                format!("  {prompt}"),
                app.theme.caption_style(),
            )));
        }
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "Press Esc or ? to close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup_area);
}

/// Render the saved stories, newest first
fn render_history_overlay(frame: &mut Frame, app: &App, selected: usize, area: Rect) {
    let popup_area = centered_rect_fixed(70, 24, area);
    frame.render_widget(Clear, popup_area);

    let history = app.session.history();
    let mut lines = Vec::new();

    if history.is_empty() {
        lines.push(Line::from(Span::styled(
            "No saved stories yet",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    for (i, story) in history.iter().enumerate() {
        let marker = if i == selected { "▸ " } else { "  " };
        let title_style = if i == selected {
            app.theme.title_style()
        } else {
            app.theme.page_style()
        };

        let mut heading = vec![
            Span::styled(marker, app.theme.title_style()),
            Span::styled(story.title(), title_style),
            Span::styled(
                format!("  {}", story.created_at.format("%Y-%m-%d %H:%M")),
                app.theme.system_style(),
            ),
        ];
        if story.is_fallback {
            heading.push(Span::styled("  demo", app.theme.demo_style()));
        }
        lines.push(Line::from(heading));
        lines.push(Line::from(Span::styled(
            format!("    {}", story.preview()),
            app.theme.caption_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "j/k select  Enter open  Esc close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(format!(" History ({}) ", history.len()))
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup_area);
}
