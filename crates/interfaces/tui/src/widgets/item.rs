use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use tally_core::{Field, Segment, ViewLine};

use crate::theme::Theme;

/// Screen positions the app needs after drawing the item.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemLayout {
    /// Top-left cell of the account field.
    pub account: Option<Position>,
    pub cursor: Option<Position>,
}

pub fn draw_item(
    frame: &mut Frame<'_>,
    area: Rect,
    lines: &[ViewLine],
    title: &str,
    theme: &Theme,
) -> ItemLayout {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);

    let mut layout = ItemLayout::default();
    let mut rendered = Vec::with_capacity(lines.len());
    for (row, line) in lines.iter().enumerate() {
        let y = inner.y.saturating_add(row as u16);
        let mut x = inner.x;
        let mut spans = Vec::with_capacity(line.segments.len());
        for segment in &line.segments {
            let span = segment_span(segment, theme);
            if segment.region == Some(Field::Account) {
                layout.account = Some(Position::new(x, y));
            }
            if let (Some(cursor), false) = (segment.cursor, segment.selected) {
                let offset = Span::raw(segment.text.chars().take(cursor).collect::<String>()).width();
                layout.cursor = Some(Position::new(x.saturating_add(offset as u16), y));
            }
            x = x.saturating_add(span.width() as u16);
            spans.push(span);
        }
        rendered.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(rendered).block(block), area);
    if let Some(cursor) = layout.cursor.filter(|pos| inner.contains(*pos)) {
        frame.set_cursor_position(cursor);
    }
    layout
}

fn segment_span(segment: &Segment, theme: &Theme) -> Span<'static> {
    let mut style = Style::default().fg(theme.tone(segment.tone));
    if segment.edited {
        style = style.add_modifier(Modifier::BOLD);
    }
    if segment.focused {
        style = style.bg(theme.selection).add_modifier(Modifier::UNDERLINED);
    }
    if segment.selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(segment.text.clone(), style)
}

pub fn draw_placeholder(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let widget = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(theme.muted),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(widget, area);
}
