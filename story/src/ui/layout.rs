//! Screen layout for the storybook TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the main screen, top to bottom
#[derive(Debug, Clone, Copy)]
pub struct StoryLayout {
    pub title_area: Rect,
    pub page_area: Rect,
    pub input_area: Rect,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
}

impl StoryLayout {
    /// Split the screen. The input area is zero-height unless `with_input`.
    pub fn calculate(area: Rect, with_input: bool) -> Self {
        let input_height = if with_input { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(6),
                Constraint::Length(input_height),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            title_area: chunks[0],
            page_area: chunks[1],
            input_area: chunks[2],
            status_bar: chunks[3],
            hotkey_bar: chunks[4],
        }
    }
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_without_input() {
        let layout = StoryLayout::calculate(Rect::new(0, 0, 80, 24), false);
        assert_eq!(layout.input_area.height, 0);
        assert_eq!(layout.hotkey_bar.y, 23);
        assert_eq!(layout.page_area.height, 24 - 2 - 3 - 1);
    }

    #[test]
    fn test_centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(60, 6, area);
        assert_eq!(rect, Rect::new(0, 2, 40, 6));
    }
}
