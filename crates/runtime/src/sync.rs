//! Change stream from the staging server.
//!
//! The server pushes a server-sent event whenever the staging file changes.
//! Every event, and every successful reconnection, becomes a
//! [`BackendEvent::UpstreamChanged`] so the session reloads.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::ACCEPT;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tally_config::AppConfig;

use crate::events::{BackendEvent, SyncState};

/// Incremental `text/event-stream` parser.  Only `data:` fields matter; other
/// fields and comments are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the data of every event completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let raw = self.pending.drain(..=newline).collect::<Vec<_>>();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            if field == "data" {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        events
    }
}

enum StreamEnd {
    ReceiverDropped,
    Closed,
}

/// Long-lived subscription to `GET /api/file-changes` with reconnect backoff.
#[derive(Debug, Clone)]
pub struct SyncChannel {
    client: reqwest::Client,
    url: String,
    initial_delay: Duration,
    max_delay: Duration,
}

impl SyncChannel {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client for change stream")?;
        let initial_delay = Duration::from_millis(config.sync.reconnect_initial_ms.max(1));
        Ok(Self {
            client,
            url: format!("{}/file-changes", config.api_root()),
            initial_delay,
            max_delay: Duration::from_millis(config.sync.reconnect_max_ms).max(initial_delay),
        })
    }

    pub fn spawn(self, tx: mpsc::UnboundedSender<BackendEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }

    /// Runs until the receiving side of `tx` is dropped.
    pub async fn run(self, tx: mpsc::UnboundedSender<BackendEvent>) {
        let mut delay = self.initial_delay;
        let mut attempt: usize = 0;
        loop {
            let resync = attempt > 0;
            attempt += 1;
            match self.stream(&tx, &mut delay, resync).await {
                Ok(StreamEnd::ReceiverDropped) => break,
                Ok(StreamEnd::Closed) => warn!(url = %self.url, "change stream closed by server"),
                Err(err) => warn!(url = %self.url, ?err, "change stream failed; retrying"),
            }

            if tx.send(BackendEvent::Sync(SyncState::Disconnected)).is_err() {
                break;
            }
            tokio::select! {
                _ = tx.closed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(self.max_delay);
        }
        debug!("change stream stopped");
    }

    async fn stream(
        &self,
        tx: &mpsc::UnboundedSender<BackendEvent>,
        delay: &mut Duration,
        resync: bool,
    ) -> Result<StreamEnd> {
        let mut response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        *delay = self.initial_delay;
        info!(url = %self.url, "change stream connected");
        if tx.send(BackendEvent::Sync(SyncState::Connected)).is_err() {
            return Ok(StreamEnd::ReceiverDropped);
        }
        // Changes made while disconnected were never announced.
        if resync && tx.send(BackendEvent::UpstreamChanged).is_err() {
            return Ok(StreamEnd::ReceiverDropped);
        }

        let mut decoder = SseDecoder::new();
        loop {
            let chunk = tokio::select! {
                _ = tx.closed() => return Ok(StreamEnd::ReceiverDropped),
                chunk = response.chunk() => chunk?,
            };
            let Some(chunk) = chunk else {
                return Ok(StreamEnd::Closed);
            };
            for data in decoder.feed(&chunk) {
                debug!(%data, "upstream change");
                if tx.send(BackendEvent::UpstreamChanged).is_err() {
                    return Ok(StreamEnd::ReceiverDropped);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    #[test]
    fn decoder_emits_on_blank_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: rel").is_empty());
        assert!(decoder.feed(b"oad\n").is_empty());
        assert_eq!(decoder.feed(b"\n"), vec!["reload"]);
    }

    #[test]
    fn decoder_handles_crlf_comments_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b": keep-alive\r\n\r\nevent: x\r\ndata: a\r\ndata:b\r\n\r\ndata: reload\n\n");
        assert_eq!(events, vec!["a\nb", "reload"]);
    }

    #[test]
    fn decoder_ignores_events_without_data() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: ping\nid: 4\n\n").is_empty());
    }

    fn channel(base_url: String) -> SyncChannel {
        let mut config = AppConfig::default();
        config.server.base_url = base_url;
        config.sync.reconnect_initial_ms = 10;
        config.sync.reconnect_max_ms = 20;
        SyncChannel::new(&config).unwrap()
    }

    #[tokio::test]
    async fn reconnects_and_resyncs_after_drop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            for round in 0..2 {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await.unwrap();
                socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\ndata: reload\n\n",
                    )
                    .await
                    .unwrap();
                socket.flush().await.unwrap();
                if round == 1 {
                    held.push(socket);
                }
            }
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(held);
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = channel(format!("http://{addr}")).spawn(tx);

        let mut seen = Vec::new();
        while seen.len() < 6 {
            let event = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("timed out waiting for sync event")
                .unwrap();
            seen.push(match event {
                BackendEvent::Sync(SyncState::Connected) => "connected",
                BackendEvent::Sync(SyncState::Disconnected) => "disconnected",
                BackendEvent::UpstreamChanged => "changed",
                BackendEvent::Completed(_) => "completed",
            });
        }
        assert_eq!(
            seen,
            vec![
                "connected",
                "changed",
                "disconnected",
                "connected",
                "changed",
                "changed"
            ]
        );

        drop(rx);
        timeout(Duration::from_secs(5), handle)
            .await
            .expect("channel did not stop after receiver dropped")
            .unwrap();
    }
}
