use std::future::Future;
use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::debug;

use tally_runtime::BackendEvent;

use crate::app::{App, UiCommand};
use crate::events::AppEvent;

/// Read crossterm events on a dedicated OS thread so the async loop never
/// blocks on `event::read()`.
fn spawn_crossterm_reader() -> mpsc::UnboundedReceiver<CrosstermEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run the review loop until the user quits.  Every [`UiCommand::Dispatch`]
/// produced by the app is passed to `on_command`.
pub async fn run_app_with<F, Fut>(app: &mut App, mut on_command: F) -> Result<()>
where
    F: FnMut(UiCommand) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    let mut tick_interval = tokio::time::interval(Duration::from_millis(50));
    // First tick fires immediately; skip it so we don't double-draw on entry.
    tick_interval.tick().await;
    let mut term_rx = spawn_crossterm_reader();

    let initial = app.start();
    on_command(UiCommand::Dispatch(initial)).await?;

    let result = async {
        loop {
            terminal.draw(|f| app.draw(f))?;

            let command = tokio::select! {
                backend = app.backend_rx.recv() => match backend {
                    Some(backend) => app.update(AppEvent::Backend(backend)),
                    None => None,
                },
                _ = tick_interval.tick() => app.update(AppEvent::Tick),
                term_event = term_rx.recv() => match term_event {
                    Some(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        app.update(AppEvent::Key(key))
                    }
                    Some(CrosstermEvent::Mouse(mouse)) => app.update(AppEvent::Mouse(mouse)),
                    Some(CrosstermEvent::Resize(w, h)) => app.update(AppEvent::Resize(w, h)),
                    Some(_) => None,
                    None => Some(UiCommand::Quit),
                },
            };

            match command {
                Some(UiCommand::Quit) => break,
                Some(command) => on_command(command).await?,
                None => {}
            }
        }
        Ok(()) as Result<()>
    }
    .await;

    debug!("restoring terminal state");
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

pub fn create_backend_channel() -> (
    mpsc::UnboundedSender<BackendEvent>,
    mpsc::UnboundedReceiver<BackendEvent>,
) {
    mpsc::unbounded_channel()
}
