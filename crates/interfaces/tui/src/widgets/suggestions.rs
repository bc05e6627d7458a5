use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use tally_core::Suggestions;

use crate::theme::Theme;

/// Draw the candidate list just below `anchor`, clamped to `bounds`.
/// Returns the rect holding the candidate rows, one row per candidate.
pub fn draw_suggestions(
    frame: &mut Frame<'_>,
    bounds: Rect,
    anchor: Position,
    suggestions: &Suggestions,
    theme: &Theme,
) -> Option<Rect> {
    let widest = suggestions
        .candidates
        .iter()
        .map(|c| Span::raw(c.as_str()).width())
        .max()
        .unwrap_or(0) as u16;
    let width = widest.saturating_add(2).min(bounds.width);
    let height = (suggestions.candidates.len() as u16)
        .saturating_add(2)
        .min(bounds.bottom().saturating_sub(anchor.y + 1));
    if width < 3 || height < 3 {
        return None;
    }
    let x = anchor.x.min(bounds.right().saturating_sub(width));
    let area = Rect::new(x, anchor.y + 1, width, height);

    let lines = suggestions
        .candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| {
            let style = if Some(idx) == suggestions.highlighted {
                Style::default().fg(theme.background).bg(theme.accent)
            } else {
                Style::default().fg(theme.foreground)
            };
            Line::from(Span::styled(candidate.clone(), style))
        })
        .collect::<Vec<_>>();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.muted));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
    Some(inner)
}

/// Candidate index under a click at `position`, if any.
pub fn hit_test(rows: Rect, position: Position) -> Option<usize> {
    rows.contains(position)
        .then(|| usize::from(position.y - rows.y))
}
