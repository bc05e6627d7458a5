pub mod app;
pub mod events;
pub mod theme;
pub mod tui;
pub mod widgets;

pub use app::{App, UiCommand};
pub use events::AppEvent;
pub use theme::{Theme, ThemeName};
