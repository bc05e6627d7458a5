//! Focus and suggestion handling for the editable fields of one item.
//!
//! The editor owns only transient UI state.  Everything the user commits to
//! is reported as [`EditorOutput`] and turned into session intents by the
//! caller.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::matcher::{self, Catalog};
use crate::model::Field;
use crate::input::LineInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    Confirm,
    Cancel,
    Blur,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutput {
    /// The field's value changed; write it to the draft.
    Input { field: Field, value: String },
    /// A candidate was picked for the account field.
    Selected { value: String },
    /// Focus left the field.
    Released { field: Field },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    Idle,
    Focused,
    Editing,
}

/// Open candidate list for the account field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub candidates: Vec<String>,
    pub highlighted: Option<usize>,
}

impl Suggestions {
    fn step(&mut self, forward: bool) {
        let len = self.candidates.len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(match (self.highlighted, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => i.checked_sub(1).unwrap_or(len - 1),
        });
    }

    fn chosen(&self) -> Option<&String> {
        self.candidates.get(self.highlighted.unwrap_or(0))
    }
}

#[derive(Debug)]
pub struct FieldEditor {
    focused: Option<Field>,
    phase: FieldPhase,
    text: LineInput,
    /// Value the field held when it was focused.
    initial: String,
    suggestions: Option<Suggestions>,
    close_at: Option<Instant>,
    blur_close_delay: Duration,
    suggestion_limit: usize,
}

impl FieldEditor {
    pub fn new(blur_close_delay: Duration, suggestion_limit: usize) -> Self {
        Self {
            focused: None,
            phase: FieldPhase::Idle,
            text: LineInput::default(),
            initial: String::new(),
            suggestions: None,
            close_at: None,
            blur_close_delay,
            suggestion_limit: suggestion_limit.max(1),
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused.is_some()
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.focused
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn text(&self) -> &LineInput {
        &self.text
    }

    /// The focused field together with its live text, for rendering.
    pub fn active(&self) -> Option<(Field, &LineInput)> {
        self.focused.map(|field| (field, &self.text))
    }

    pub fn suggestions(&self) -> Option<&Suggestions> {
        self.suggestions.as_ref()
    }

    /// Focus `field`, selecting its whole `current` value.
    pub fn focus(&mut self, field: Field, current: &str, catalog: &Catalog) {
        debug!(field = field.label(), "focus");
        self.focused = Some(field);
        self.phase = FieldPhase::Focused;
        self.text = LineInput::selecting_all(current);
        self.initial = current.to_string();
        self.close_at = None;
        self.suggestions = None;
        if field == Field::Account {
            self.refresh(catalog);
        }
    }

    pub fn key(&mut self, key: EditorKey, catalog: &Catalog, now: Instant) -> Vec<EditorOutput> {
        let Some(field) = self.focused else {
            return Vec::new();
        };

        match key {
            EditorKey::Char(_)
            | EditorKey::Backspace
            | EditorKey::Delete
            | EditorKey::Left
            | EditorKey::Right
            | EditorKey::Home
            | EditorKey::End => {
                if self.text.apply(key) {
                    self.edited(field, catalog)
                } else {
                    Vec::new()
                }
            }
            EditorKey::Up | EditorKey::Down => {
                if let Some(list) = self.suggestions.as_mut() {
                    list.step(key == EditorKey::Down);
                }
                Vec::new()
            }
            EditorKey::Confirm => match self.suggestions.take() {
                Some(list) => match list.chosen() {
                    Some(value) => {
                        let value = value.clone();
                        self.text.set(value.clone());
                        self.phase = FieldPhase::Editing;
                        vec![EditorOutput::Selected { value }]
                    }
                    None => Vec::new(),
                },
                None => self.release(field),
            },
            EditorKey::Cancel => {
                if self.suggestions.take().is_some() {
                    Vec::new()
                } else {
                    self.release(field)
                }
            }
            EditorKey::Blur => self.blur(now),
        }
    }

    /// Release focus.  An open list stays up for the blur delay so a pointer
    /// selection racing the blur still lands.
    pub fn blur(&mut self, now: Instant) -> Vec<EditorOutput> {
        let Some(field) = self.focused else {
            return Vec::new();
        };
        let list = self.suggestions.take();
        let out = self.release(field);
        if list.is_some() {
            self.suggestions = list;
            self.close_at = Some(now + self.blur_close_delay);
        }
        out
    }

    /// Pick the candidate at `index` in the visible list.
    pub fn pointer_select(&mut self, index: usize) -> Option<EditorOutput> {
        let value = self.suggestions.as_ref()?.candidates.get(index)?.clone();
        self.suggestions = None;
        self.close_at = None;
        if self.focused == Some(Field::Account) {
            self.text.set(value.clone());
            self.phase = FieldPhase::Editing;
        }
        Some(EditorOutput::Selected { value })
    }

    /// Apply a deferred close once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.close_at.is_some_and(|deadline| now >= deadline) {
            self.close_at = None;
            self.suggestions = None;
        }
    }

    /// Drop all state, e.g. when the item under review changes.
    pub fn reset(&mut self) {
        self.focused = None;
        self.phase = FieldPhase::Idle;
        self.text = LineInput::default();
        self.initial.clear();
        self.suggestions = None;
        self.close_at = None;
    }

    /// Close any open list after the catalog was replaced.
    pub fn invalidate(&mut self) {
        self.suggestions = None;
        self.close_at = None;
    }

    fn edited(&mut self, field: Field, catalog: &Catalog) -> Vec<EditorOutput> {
        self.phase = FieldPhase::Editing;
        self.close_at = None;
        if field == Field::Account {
            self.refresh(catalog);
        }
        vec![EditorOutput::Input {
            field,
            value: self.text.value().to_string(),
        }]
    }

    /// Leave the field.  An untouched value is not written back.
    fn release(&mut self, field: Field) -> Vec<EditorOutput> {
        let value = self.text.value().to_string();
        let untouched = value == self.initial;
        self.reset();
        let mut out = Vec::with_capacity(2);
        if !untouched {
            out.push(EditorOutput::Input { field, value });
        }
        out.push(EditorOutput::Released { field });
        out
    }

    fn refresh(&mut self, catalog: &Catalog) {
        let mut candidates = matcher::filter(self.text.value(), catalog);
        candidates.truncate(self.suggestion_limit);
        self.suggestions = (!candidates.is_empty()).then_some(Suggestions {
            candidates,
            highlighted: None,
        });
    }
}
