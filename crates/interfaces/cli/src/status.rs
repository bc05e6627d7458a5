use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize};
use tracing::info;

use tally_config::AppConfig;
use tally_core::{ReviewBackend, Snapshot, Tone, render_item};
use tally_runtime::HttpBackend;

pub(crate) async fn run_status(config: &AppConfig) -> Result<()> {
    let backend = HttpBackend::new(config)?;
    let snapshot = backend
        .init()
        .await
        .with_context(|| format!("could not load queue from {}", config.server.base_url))?;
    info!(items = snapshot.items.len(), "fetched queue");

    let color = io::stdout().is_terminal();
    let mut out = io::stdout().lock();
    write_queue(&mut out, &snapshot, color)?;
    out.flush()?;
    Ok(())
}

fn tone_color(tone: Tone) -> Option<Color> {
    match tone {
        Tone::Date => Some(Color::Yellow),
        Tone::Flag | Tone::Account => Some(Color::Blue),
        Tone::Payee => Some(Color::Magenta),
        Tone::Tag | Tone::Link => Some(Color::Cyan),
        Tone::Amount => Some(Color::DarkYellow),
        Tone::Placeholder => Some(Color::DarkGrey),
        Tone::Narration | Tone::Plain => None,
    }
}

fn write_queue(out: &mut impl Write, snapshot: &Snapshot, color: bool) -> io::Result<()> {
    if snapshot.items.is_empty() {
        let done = "No pending transactions.";
        if color {
            writeln!(out, "{}", done.green())?;
        } else {
            writeln!(out, "{done}")?;
        }
        return Ok(());
    }

    for item in &snapshot.items {
        // The last line is the unset account; status output shows the
        // transaction as staged.
        let lines = render_item(item, None, None);
        let staged = &lines[..lines.len().saturating_sub(1)];
        for line in staged {
            for segment in &line.segments {
                match tone_color(segment.tone).filter(|_| color) {
                    Some(c) => write!(out, "{}", segment.text.as_str().with(c))?,
                    None => write!(out, "{}", segment.text)?,
                }
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    let summary = format!(
        "{} pending transaction{} • {} known accounts",
        snapshot.items.len(),
        if snapshot.items.len() == 1 { "" } else { "s" },
        snapshot.available_accounts.len()
    );
    if color {
        writeln!(out, "{}", summary.bold())
    } else {
        writeln!(out, "{summary}")
    }
}
