use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
};
use tokio::sync::mpsc;
use tracing::debug;

use tally_config::AppConfig;
use tally_core::{
    Completion, Draft, EditorKey, EditorOutput, Effect, Field, FieldEditor, Intent, ItemId, Phase,
    Session, render_item,
};
use tally_runtime::{BackendEvent, SyncState};

use crate::{
    events::AppEvent,
    theme::Theme,
    widgets::{
        item::{draw_item, draw_placeholder},
        status::{draw_footer, draw_header, draw_notice},
        suggestions::{draw_suggestions, hit_test},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    /// Network work for the runtime to perform.
    Dispatch(Vec<Effect>),
}

pub struct App {
    pub session: Session,
    pub editor: FieldEditor,
    pub backend_rx: mpsc::UnboundedReceiver<BackendEvent>,
    pub theme: Theme,
    /// `None` while the change stream is disabled.
    pub sync: Option<SyncState>,
    pub show_help: bool,
    pub spinner_tick: usize,
    viewing: Option<ItemId>,
    suggestion_rows: Option<Rect>,
}

impl App {
    pub fn new(backend_rx: mpsc::UnboundedReceiver<BackendEvent>, config: &AppConfig) -> Self {
        Self {
            session: Session::new(),
            editor: FieldEditor::new(
                Duration::from_millis(config.ui.blur_close_delay_ms),
                config.ui.suggestion_limit,
            ),
            backend_rx,
            theme: Theme::from_config(&config.ui.theme),
            sync: config.sync.enabled.then_some(SyncState::Disconnected),
            show_help: config.ui.show_help,
            spinner_tick: 0,
            viewing: None,
            suggestion_rows: None,
        }
    }

    /// Effects for the initial load.
    pub fn start(&mut self) -> Vec<Effect> {
        self.session.start()
    }

    pub fn update(&mut self, event: AppEvent) -> Option<UiCommand> {
        let effects = match event {
            AppEvent::Tick => {
                self.spinner_tick = self.spinner_tick.wrapping_add(1);
                self.editor.tick(Instant::now());
                Vec::new()
            }
            AppEvent::Resize(_, _) => Vec::new(),
            AppEvent::Backend(event) => self.apply_backend(event),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Key(key) => {
                debug!(?key, "ui key event");
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    return Some(UiCommand::Quit);
                }
                if self.editor.is_focused() {
                    self.handle_editor_key(key)
                } else if key.code == KeyCode::Char('q') {
                    return Some(UiCommand::Quit);
                } else {
                    self.handle_global_key(key)
                }
            }
        };

        self.follow_current_item();
        (!effects.is_empty()).then_some(UiCommand::Dispatch(effects))
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let intent = match key.code {
            KeyCode::Left | KeyCode::Char('h') => Intent::Prev,
            KeyCode::Right | KeyCode::Char('l') => Intent::Next,
            KeyCode::Enter | KeyCode::Char('c') => Intent::Commit,
            KeyCode::Char('r') => Intent::ReloadSignal,
            KeyCode::Esc => {
                self.session.clear_notice();
                return Vec::new();
            }
            KeyCode::Char(ch) => {
                if let Some(field) = Field::from_mnemonic(ch) {
                    self.focus(field);
                }
                return Vec::new();
            }
            _ => return Vec::new(),
        };
        self.session.handle(intent)
    }

    fn focus(&mut self, field: Field) {
        if !self.session.is_interactive() {
            return;
        }
        let Some(item) = self.session.current_item() else {
            return;
        };
        let current = Draft::field_value(self.session.current_draft(), item, field);
        self.editor.focus(field, &current, self.session.catalog());
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let editor_key = match key.code {
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                EditorKey::Char(ch)
            }
            KeyCode::Backspace => EditorKey::Backspace,
            KeyCode::Delete => EditorKey::Delete,
            KeyCode::Left => EditorKey::Left,
            KeyCode::Right => EditorKey::Right,
            KeyCode::Home => EditorKey::Home,
            KeyCode::End => EditorKey::End,
            KeyCode::Up => EditorKey::Up,
            KeyCode::Down => EditorKey::Down,
            KeyCode::Enter => EditorKey::Confirm,
            KeyCode::Esc => EditorKey::Cancel,
            KeyCode::Tab | KeyCode::BackTab => EditorKey::Blur,
            _ => return Vec::new(),
        };
        let outputs = self
            .editor
            .key(editor_key, self.session.catalog(), Instant::now());
        self.apply_editor_outputs(outputs)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let Some(index) = self
            .suggestion_rows
            .and_then(|rows| hit_test(rows, Position::new(mouse.column, mouse.row)))
        else {
            return Vec::new();
        };
        match self.editor.pointer_select(index) {
            Some(output) => self.apply_editor_outputs(vec![output]),
            None => Vec::new(),
        }
    }

    fn apply_editor_outputs(&mut self, outputs: Vec<EditorOutput>) -> Vec<Effect> {
        let mut effects = Vec::new();
        for output in outputs {
            let intent = match output {
                EditorOutput::Input { field, value } => Intent::FieldInput { field, value },
                EditorOutput::Selected { value } => Intent::SelectSuggestion { value },
                EditorOutput::Released { field } => {
                    debug!(field = field.label(), "field released");
                    continue;
                }
            };
            effects.extend(self.session.handle(intent));
        }
        effects
    }

    fn apply_backend(&mut self, event: BackendEvent) -> Vec<Effect> {
        match event {
            BackendEvent::Completed(completion) => {
                let reloaded = matches!(completion, Completion::Loaded { .. });
                let effects = self.session.complete(completion);
                if reloaded {
                    self.editor.invalidate();
                }
                effects
            }
            BackendEvent::UpstreamChanged => self.session.handle(Intent::ReloadSignal),
            BackendEvent::Sync(state) => {
                if self.sync.is_some() {
                    self.sync = Some(state);
                }
                Vec::new()
            }
        }
    }

    /// Drop transient edit state whenever the item on screen changes or input
    /// stops being accepted.
    fn follow_current_item(&mut self) {
        let current = self.session.queue().current_id().cloned();
        if current != self.viewing || !self.session.is_interactive() {
            if self.editor.is_focused() || current != self.viewing {
                self.editor.reset();
            }
            self.viewing = current;
        }
    }

    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(4),
                Constraint::Length(1),
                Constraint::Length(u16::from(self.show_help)),
            ])
            .split(frame.area());

        draw_header(
            frame,
            outer[0],
            &self.session,
            self.sync,
            self.spinner_tick,
            &self.theme,
        );

        self.suggestion_rows = None;
        let item = self.session.current_item();
        match (self.session.phase(), item) {
            (Phase::Loading, None) => draw_placeholder(frame, outer[1], "Loading…", &self.theme),
            (Phase::Empty, _) => draw_placeholder(
                frame,
                outer[1],
                "All transactions reviewed. Press r to check again or q to quit.",
                &self.theme,
            ),
            (Phase::Error { message }, None) => {
                draw_placeholder(frame, outer[1], message, &self.theme)
            }
            (_, Some(item)) => {
                let lines = render_item(item, self.session.current_draft(), self.editor.active());
                let title = format!("{} • {}", item.date, item.id);
                let layout = draw_item(frame, outer[1], &lines, &title, &self.theme);
                if let (Some(anchor), Some(suggestions)) = (layout.account, self.editor.suggestions())
                {
                    self.suggestion_rows =
                        draw_suggestions(frame, frame.area(), anchor, suggestions, &self.theme);
                }
            }
            (_, None) => {}
        }

        draw_notice(frame, outer[2], self.session.notice(), &self.theme);
        if self.show_help {
            draw_footer(frame, outer[3], self.editor.is_focused(), &self.theme);
        }
    }
}
