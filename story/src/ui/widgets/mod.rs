//! TUI widgets for the storybook

pub mod input;
pub mod page;
pub mod status_bar;

pub use input::InputWidget;
pub use page::PageWidget;
pub use status_bar::{HotkeyBarWidget, StatusBarWidget};
