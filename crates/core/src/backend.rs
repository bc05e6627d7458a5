//! Contract with the staging server.  The session never talks to the network
//! itself; it emits effects that a runtime executes against a
//! [`ReviewBackend`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Draft, Item, ItemId};

/// Response of `GET /api/init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub available_accounts: Vec<String>,
}

/// Response of `GET /api/transaction/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub transaction: Item,
}

/// Body of `POST /api/transaction/{id}/commit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub expense_account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

impl CommitRequest {
    /// Build the request for `item`, sending payee/narration only when the
    /// draft actually changes them.  A missing value and an empty one are the
    /// same.
    pub fn from_draft(item: &Item, draft: &Draft) -> Self {
        let changed = |edited: &Option<String>, original: &Option<String>| {
            edited
                .as_ref()
                .filter(|value| value.as_str() != original.as_deref().unwrap_or_default())
                .cloned()
        };
        Self {
            expense_account: draft.account.trim().to_string(),
            payee: changed(&draft.payee, &item.payee),
            narration: changed(&draft.narration, &item.narration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub ok: bool,
    pub remaining_count: usize,
}

/// Failure payload the server sends alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    /// Business failure reported by the server; the message is shown verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn init(&self) -> Result<Snapshot, ClientError>;

    async fn transaction(&self, id: &ItemId) -> Result<Item, ClientError>;

    async fn commit(
        &self,
        id: &ItemId,
        request: &CommitRequest,
    ) -> Result<CommitOutcome, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item() -> Item {
        Item {
            id: ItemId::new("t1"),
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            flag: "*".to_string(),
            payee: Some("Shop".to_string()),
            narration: Some("groceries".to_string()),
            tags: vec![],
            links: vec![],
            postings: vec![],
        }
    }

    #[test]
    fn commit_request_omits_unchanged_overrides() {
        let draft = Draft {
            account: "  Expenses:Food ".to_string(),
            payee: Some("Shop".to_string()),
            narration: Some("weekly groceries".to_string()),
        };
        let request = CommitRequest::from_draft(&item(), &draft);
        assert_eq!(request.expense_account, "Expenses:Food");
        assert_eq!(request.payee, None);
        assert_eq!(request.narration.as_deref(), Some("weekly groceries"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "expense_account": "Expenses:Food",
                "narration": "weekly groceries"
            })
        );
    }

    #[test]
    fn empty_override_of_missing_field_is_not_sent() {
        let item = Item {
            payee: None,
            narration: None,
            ..item()
        };
        let draft = Draft {
            account: "Expenses:Food".to_string(),
            payee: Some(String::new()),
            narration: Some("lunch".to_string()),
        };
        let request = CommitRequest::from_draft(&item, &draft);
        assert_eq!(request.payee, None);
        assert_eq!(request.narration.as_deref(), Some("lunch"));
    }

    #[test]
    fn snapshot_tolerates_missing_optional_fields() {
        let snapshot: Snapshot = serde_json::from_str(r#"{ "items": [] }"#).unwrap();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.current_index, 0);
        assert!(snapshot.available_accounts.is_empty());
    }

    #[test]
    fn server_error_displays_verbatim() {
        let err = ClientError::Server {
            status: 400,
            message: "Failed to commit: unknown account".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to commit: unknown account");
    }
}
