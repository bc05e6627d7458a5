mod client;
mod dispatch;
mod events;
pub mod sync;

pub use client::HttpBackend;
pub use dispatch::Dispatcher;
pub use events::{BackendEvent, SyncState};
pub use sync::{SseDecoder, SyncChannel};
