//! Event handling for the storybook TUI

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{Action, App, InputMode};
use crate::ui::Overlay;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        app.should_quit = true;
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Context | InputMode::ApiKey | InputMode::EditPage => {
            handle_input_mode(app, key)
        }
    }
}

/// Handle keys while reading
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return EventResult::Quit;
        }

        // Playback
        KeyCode::Char(' ') => app.toggle_play(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_page(),
        KeyCode::Right | KeyCode::Char('l') => app.next_page(),
        KeyCode::Char('m') => app.toggle_mute(),

        // Stories
        KeyCode::Char('r') => app.request(Action::Generate),
        KeyCode::Char('c') => app.begin_input(InputMode::Context),
        KeyCode::Char('e') => {
            if app.storybook.current_page().is_some() {
                app.begin_input(InputMode::EditPage);
            } else {
                app.set_status("No page to edit");
            }
        }
        KeyCode::Char('s') => app.request(Action::Save),
        KeyCode::Char('x') => app.request(Action::Export(PathBuf::from("."))),
        KeyCode::Char('H') => app.show_history(),

        // API key
        KeyCode::Char('k') => app.begin_input(InputMode::ApiKey),
        KeyCode::Char('K') => app.request(Action::ClearKey),

        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Esc => app.session.dismiss_advisory(),

        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys while the input line is open
fn handle_input_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys while an overlay is shown
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match app.overlay() {
        Some(Overlay::History { .. }) => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.move_history_selection(1),
            KeyCode::Char('k') | KeyCode::Up => app.move_history_selection(-1),
            KeyCode::Enter => app.open_selected_history(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('H') => app.close_overlay(),
            _ => return EventResult::Continue,
        },
        _ => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
                app.close_overlay()
            }
            _ => return EventResult::Continue,
        },
    }
    EventResult::NeedsRedraw
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_core::headless::HeadlessConfig;
    use story_core::testing::{sample_params, MockGenerator, TestHarness};
    use story_core::{GenerationError, Narrator, SilentNarrator};
    use tokio::sync::mpsc;

    const STORY: &str = "Sam Goes to School\n\nI walk to school.\n\nI say hello.";

    async fn test_app(generator: MockGenerator) -> App {
        let harness = TestHarness::with_generator(generator)
            .await
            .unwrap()
            .with_credential("sk-test")
            .await
            .unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();
        let narrator: Box<dyn Narrator> = Box::new(SilentNarrator);
        App::new(
            harness.session,
            narrator,
            rx,
            HeadlessConfig::new(sample_params()),
        )
    }

    async fn run_pending(app: &mut App) {
        while let Some(action) = app.take_pending() {
            app.run_action(action).await;
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = test_app(MockGenerator::new()).await;
        assert_eq!(handle_event(&mut app, key(KeyCode::Char('q'))), EventResult::Quit);

        let mut app = test_app(MockGenerator::new()).await;
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(handle_event(&mut app, ctrl_c), EventResult::Quit);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_page_navigation() {
        let mut app = test_app(MockGenerator::new().with_story(STORY)).await;
        app.start();
        run_pending(&mut app).await;
        assert_eq!(app.storybook.current_page(), Some("Sam Goes to School"));

        handle_event(&mut app, key(KeyCode::Right));
        handle_event(&mut app, key(KeyCode::Char('l')));
        assert_eq!(app.storybook.current_page(), Some("I say hello."));

        handle_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.storybook.current_page(), Some("I walk to school."));
    }

    #[tokio::test]
    async fn test_mute_toggles() {
        let mut app = test_app(MockGenerator::new().with_story(STORY)).await;
        app.start();
        run_pending(&mut app).await;

        handle_event(&mut app, key(KeyCode::Char('m')));
        assert!(app.storybook.state().muted);
        handle_event(&mut app, key(KeyCode::Char('m')));
        assert!(!app.storybook.state().muted);
    }

    #[tokio::test]
    async fn test_context_input_regenerates() {
        let mut app = test_app(MockGenerator::new().with_story(STORY)).await;
        app.start();
        run_pending(&mut app).await;

        handle_event(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.input_mode, InputMode::Context);
        type_text(&mut app, "New teacher");
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.params.context(), Some("New teacher"));
        assert_eq!(app.take_pending(), Some(Action::Generate));
    }

    #[tokio::test]
    async fn test_escape_cancels_input() {
        let mut app = test_app(MockGenerator::new()).await;
        handle_event(&mut app, key(KeyCode::Char('k')));
        type_text(&mut app, "sk-abc");
        handle_event(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input_buffer(), "sk-ab");

        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.take_pending(), None);
    }

    #[tokio::test]
    async fn test_api_key_input_queues_key() {
        let mut app = test_app(MockGenerator::new()).await;
        handle_event(&mut app, key(KeyCode::Char('k')));
        type_text(&mut app, "sk-new");
        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.take_pending(), Some(Action::SetKey("sk-new".to_string())));
    }

    #[tokio::test]
    async fn test_edit_page_replaces_text() {
        let mut app = test_app(MockGenerator::new().with_story(STORY)).await;
        app.start();
        run_pending(&mut app).await;
        handle_event(&mut app, key(KeyCode::Right));

        handle_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.input_buffer(), "I walk to school.");
        for _ in 0.."I walk to school.".len() {
            handle_event(&mut app, key(KeyCode::Backspace));
        }
        type_text(&mut app, "I ride the bus.");
        handle_event(&mut app, key(KeyCode::Enter));

        let story = app.current_story().unwrap();
        assert_eq!(
            story.content,
            "Sam Goes to School\n\nI ride the bus.\n\nI say hello."
        );
        assert_eq!(app.storybook.current_page(), Some("I ride the bus."));
        assert_eq!(app.storybook.state().page_index, 1);
    }

    #[tokio::test]
    async fn test_blank_edit_removes_page() {
        let mut app = test_app(MockGenerator::new().with_story(STORY)).await;
        app.start();
        run_pending(&mut app).await;
        handle_event(&mut app, key(KeyCode::Right));

        handle_event(&mut app, key(KeyCode::Char('e')));
        for _ in 0..app.input_buffer().len() {
            handle_event(&mut app, key(KeyCode::Backspace));
        }
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.storybook.page_count(), 2);
        assert_eq!(
            app.current_story().unwrap().content,
            "Sam Goes to School\n\nI say hello."
        );
        assert_eq!(app.storybook.current_page(), Some("I say hello."));
    }

    #[tokio::test]
    async fn test_removing_last_page_stays_in_range() {
        let mut app = test_app(MockGenerator::new().with_story(STORY)).await;
        app.start();
        run_pending(&mut app).await;
        handle_event(&mut app, key(KeyCode::Right));
        handle_event(&mut app, key(KeyCode::Right));

        handle_event(&mut app, key(KeyCode::Char('e')));
        for _ in 0..app.input_buffer().len() {
            handle_event(&mut app, key(KeyCode::Backspace));
        }
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.storybook.page_count(), 2);
        assert_eq!(app.storybook.state().page_index, 1);
        assert_eq!(app.storybook.current_page(), Some("I walk to school."));
    }

    #[tokio::test]
    async fn test_history_overlay_opens_story() {
        let mut app = test_app(
            MockGenerator::new()
                .with_story("First story")
                .with_story("Second story"),
        )
        .await;
        app.request(Action::Generate);
        run_pending(&mut app).await;
        app.request(Action::Generate);
        run_pending(&mut app).await;
        assert_eq!(app.storybook.current_page(), Some("Second story"));

        handle_event(&mut app, key(KeyCode::Char('H')));
        assert_eq!(app.overlay(), Some(&Overlay::History { selected: 0 }));

        handle_event(&mut app, key(KeyCode::Down));
        handle_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.overlay(), Some(&Overlay::History { selected: 1 }));

        handle_event(&mut app, key(KeyCode::Enter));
        assert!(!app.has_overlay());
        run_pending(&mut app).await;
        assert_eq!(app.storybook.current_page(), Some("First story"));
    }

    #[tokio::test]
    async fn test_help_overlay_swallows_keys() {
        let mut app = test_app(MockGenerator::new()).await;
        handle_event(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.overlay(), Some(&Overlay::Help));

        assert_eq!(
            handle_event(&mut app, key(KeyCode::Char('r'))),
            EventResult::Continue
        );
        assert_eq!(app.take_pending(), None);

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.has_overlay());
    }

    #[tokio::test]
    async fn test_rate_limited_story_shows_no_advisory() {
        let mut app = test_app(MockGenerator::new().with_error(GenerationError::RateLimited)).await;
        app.start();
        run_pending(&mut app).await;

        assert_eq!(app.status_message(), Some("New School Story"));
        assert!(app.current_story().unwrap().is_fallback);
        assert!(app.session.notice().is_some());
    }

    #[tokio::test]
    async fn test_rejected_key_shows_advisory() {
        let mut app =
            test_app(MockGenerator::new().with_error(GenerationError::Unauthenticated)).await;
        app.start();
        run_pending(&mut app).await;

        assert!(app.status_message().unwrap().starts_with("Invalid API key"));
    }

    #[tokio::test]
    async fn test_save_and_export_keys_queue_actions() {
        let mut app = test_app(MockGenerator::new()).await;
        handle_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.take_pending(), Some(Action::Save));
        handle_event(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.take_pending(), Some(Action::Export(PathBuf::from("."))));
        handle_event(&mut app, key(KeyCode::Char('K')));
        assert_eq!(app.take_pending(), Some(Action::ClearKey));
    }
}
