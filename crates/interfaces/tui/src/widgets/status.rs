use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use tally_core::{Notice, Phase, Session};
use tally_runtime::SyncState;

use crate::theme::Theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn draw_header(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &Session,
    sync: Option<SyncState>,
    spinner_tick: usize,
    theme: &Theme,
) {
    let position = match session.phase() {
        Phase::Reviewing { index } => format!("{}/{}", index + 1, session.queue().len()),
        _ => format!("-/{}", session.queue().len()),
    };
    let phase = match session.phase() {
        Phase::Loading => "loading",
        Phase::Reviewing { .. } if session.is_committing() => "committing",
        Phase::Reviewing { .. } => "reviewing",
        Phase::Empty => "done",
        Phase::Error { .. } => "offline",
    };
    let busy = if session.is_loading() || session.is_committing() {
        SPINNER[spinner_tick / 4 % SPINNER.len()]
    } else {
        " "
    };
    let (sync_label, sync_color) = match sync {
        Some(SyncState::Connected) => ("live", theme.success),
        Some(SyncState::Disconnected) => ("reconnecting", theme.error),
        None => ("sync off", theme.muted),
    };

    let line = Line::from(vec![
        Span::styled("tally", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" • {position} • {phase} {busy} • ")),
        Span::styled(sync_label, Style::default().fg(sync_color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_notice(frame: &mut Frame<'_>, area: Rect, notice: Option<&Notice>, theme: &Theme) {
    let Some(notice) = notice else {
        return;
    };
    let color = if notice.is_error() {
        theme.error
    } else {
        theme.success
    };
    let widget = Paragraph::new(Line::from(Span::styled(
        notice.text().to_string(),
        Style::default().fg(color),
    )));
    frame.render_widget(widget, area);
}

pub fn draw_footer(frame: &mut Frame<'_>, area: Rect, editing: bool, theme: &Theme) {
    let help = if editing {
        "type to edit • ↑/↓ choose • Enter accept • Esc close/done • Tab leave field"
    } else {
        "←/h prev • →/l next • a/p/n edit • Enter/c commit • r reload • q quit"
    };
    let widget = Paragraph::new(Line::from(Span::styled(
        help,
        Style::default().fg(theme.muted),
    )));
    frame.render_widget(widget, area);
}
