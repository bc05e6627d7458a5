use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::info;

use tally_config::AppConfig;
use tally_core::ReviewBackend;
use tally_runtime::{Dispatcher, HttpBackend, SyncChannel};
use tally_ui::{App, UiCommand};

pub(crate) async fn run_review(config: &AppConfig) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!("`tally review` needs an interactive terminal; use `tally status` instead");
    }

    let backend: Arc<dyn ReviewBackend> = Arc::new(HttpBackend::new(config)?);
    let (backend_tx, backend_rx) = tally_ui::tui::create_backend_channel();
    let dispatcher = Dispatcher::new(backend, backend_tx.clone());

    let sync = if config.sync.enabled {
        Some(SyncChannel::new(config)?.spawn(backend_tx.clone()))
    } else {
        None
    };
    drop(backend_tx);

    info!(server = %config.server.base_url, sync = config.sync.enabled, "starting review session");
    let mut app = App::new(backend_rx, config);
    let result = tally_ui::tui::run_app_with(&mut app, |command| {
        let dispatcher = dispatcher.clone();
        async move {
            if let UiCommand::Dispatch(effects) = command {
                dispatcher.dispatch(effects);
            }
            Ok(())
        }
    })
    .await;

    if let Some(handle) = sync {
        handle.abort();
    }
    info!(
        pending = app.session.queue().len(),
        unsaved_drafts = app.session.drafts().len(),
        "review session ended"
    );
    result
}
