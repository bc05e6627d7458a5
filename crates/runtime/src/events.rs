use tally_core::Completion;

/// Connection state of the change stream, shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Connected,
    Disconnected,
}

/// Everything background tasks report to the UI loop.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Completed(Completion),
    /// The staging file changed on the server; the queue should be reloaded.
    UpstreamChanged,
    Sync(SyncState),
}
