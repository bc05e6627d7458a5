use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use tally_config::AppConfig;
use tally_core::{
    ClientError, CommitOutcome, CommitRequest, ErrorPayload, Item, ItemId, ReviewBackend,
    Snapshot, TransactionEnvelope,
};

/// Characters left as-is when an id is placed in a path segment.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// [`ReviewBackend`] over the staging server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_root: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_root: config.api_root(),
            timeout: Duration::from_secs(config.server.request_timeout_secs.max(1)),
        })
    }

    fn transaction_url(&self, id: &ItemId) -> String {
        format!(
            "{}/transaction/{}",
            self.api_root,
            utf8_percent_encode(id.as_str(), ID_SEGMENT)
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ClientError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorPayload>(&body) {
            Ok(payload) => ClientError::Server {
                status: status.as_u16(),
                message: payload.error,
            },
            Err(_) => {
                warn!(%status, "server error without payload");
                ClientError::Transport(format!("server responded with {status}"))
            }
        });
    }

    serde_json::from_str::<T>(&body).map_err(|err| match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => ClientError::Server {
            status: status.as_u16(),
            message: payload.error,
        },
        Err(_) => ClientError::Decode(err.to_string()),
    })
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    async fn init(&self) -> Result<Snapshot, ClientError> {
        debug!(root = %self.api_root, "GET init");
        self.send(self.client.get(format!("{}/init", self.api_root)))
            .await
    }

    async fn transaction(&self, id: &ItemId) -> Result<Item, ClientError> {
        debug!(%id, "GET transaction");
        let envelope: TransactionEnvelope = self
            .send(self.client.get(self.transaction_url(id)))
            .await?;
        Ok(envelope.transaction)
    }

    async fn commit(
        &self,
        id: &ItemId,
        request: &CommitRequest,
    ) -> Result<CommitOutcome, ClientError> {
        debug!(%id, "POST commit");
        let url = format!("{}/commit", self.transaction_url(id));
        self.send(self.client.post(url).json(request)).await
    }
}
