//! Single-line edit buffer for the review fields, backed by a
//! [`tui_textarea::TextArea`].

use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::editor::EditorKey;

#[derive(Debug, Clone, Default)]
pub struct LineInput {
    area: TextArea<'static>,
}

impl LineInput {
    pub fn new(value: impl Into<String>) -> Self {
        let mut area = TextArea::new(vec![value.into()]);
        area.move_cursor(CursorMove::End);
        Self { area }
    }

    /// Focusing a field selects its whole value; the first edit replaces it.
    pub fn selecting_all(value: impl Into<String>) -> Self {
        let mut input = Self::new(value);
        input.area.select_all();
        input
    }

    pub fn value(&self) -> &str {
        self.area.lines().first().map(String::as_str).unwrap_or_default()
    }

    /// Cursor column in characters.
    pub fn cursor(&self) -> usize {
        self.area.cursor().1
    }

    pub fn is_selected_all(&self) -> bool {
        self.area.is_selecting()
    }

    /// Feed an editing key to the buffer. Returns whether the text changed.
    /// Keys that do not edit text are ignored.
    pub fn apply(&mut self, key: EditorKey) -> bool {
        let key = match key {
            EditorKey::Char('\n' | '\r') => return false,
            EditorKey::Char(ch) => Key::Char(ch),
            EditorKey::Backspace => Key::Backspace,
            EditorKey::Delete => Key::Delete,
            EditorKey::Left => Key::Left,
            EditorKey::Right => Key::Right,
            EditorKey::Home => Key::Home,
            EditorKey::End => Key::End,
            _ => return false,
        };
        self.area.input(Input {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        })
    }

    /// Replace the whole value, leaving the cursor at the end.
    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::new(value);
    }
}
