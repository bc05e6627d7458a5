use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use tally_core::{Completion, Effect, ReviewBackend};

use crate::events::BackendEvent;

/// Runs session effects on background tasks and reports each result as a
/// [`BackendEvent::Completed`].
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn ReviewBackend>,
    tx: mpsc::UnboundedSender<BackendEvent>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ReviewBackend>, tx: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self { backend, tx }
    }

    pub fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            let backend = Arc::clone(&self.backend);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let completion = perform(backend.as_ref(), effect).await;
                if tx.send(BackendEvent::Completed(completion)).is_err() {
                    debug!("completion dropped; UI has shut down");
                }
            });
        }
    }
}

pub async fn perform(backend: &dyn ReviewBackend, effect: Effect) -> Completion {
    match effect {
        Effect::Load { generation } => Completion::Loaded {
            generation,
            result: backend.init().await,
        },
        Effect::FetchItem { id, generation } => {
            let result = backend.transaction(&id).await;
            Completion::ItemFetched {
                id,
                generation,
                result,
            }
        }
        Effect::Commit {
            id,
            generation,
            request,
        } => {
            let result = backend.commit(&id, &request).await;
            Completion::Committed {
                id,
                generation,
                result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tally_core::{
        ClientError, CommitOutcome, CommitRequest, Intent, Item, ItemId, Phase, Session,
        Snapshot,
    };

    #[derive(Default)]
    struct FakeBackend {
        items: Mutex<Vec<Item>>,
        commits: Mutex<Vec<(ItemId, CommitRequest)>>,
    }

    fn item(id: &str) -> Item {
        Item {
            id: ItemId::new(id),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            flag: "!".to_string(),
            payee: None,
            narration: Some(id.to_string()),
            tags: vec![],
            links: vec![],
            postings: vec![],
        }
    }

    #[async_trait]
    impl ReviewBackend for FakeBackend {
        async fn init(&self) -> Result<Snapshot, ClientError> {
            Ok(Snapshot {
                items: self.items.lock().unwrap().clone(),
                current_index: 0,
                available_accounts: vec!["Expenses:Food".to_string()],
            })
        }

        async fn transaction(&self, id: &ItemId) -> Result<Item, ClientError> {
            self.items
                .lock()
                .unwrap()
                .iter()
                .find(|item| &item.id == id)
                .cloned()
                .ok_or_else(|| ClientError::Server {
                    status: 400,
                    message: format!("Transaction not found: {id}"),
                })
        }

        async fn commit(
            &self,
            id: &ItemId,
            request: &CommitRequest,
        ) -> Result<CommitOutcome, ClientError> {
            self.commits
                .lock()
                .unwrap()
                .push((id.clone(), request.clone()));
            let mut items = self.items.lock().unwrap();
            items.retain(|item| &item.id != id);
            Ok(CommitOutcome {
                ok: true,
                remaining_count: items.len(),
            })
        }
    }

    async fn next_completion(rx: &mut mpsc::UnboundedReceiver<BackendEvent>) -> Completion {
        match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(BackendEvent::Completed(completion))) => completion,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn perform_maps_fetch_errors_into_completion() {
        let backend = FakeBackend::default();
        let completion = perform(
            &backend,
            Effect::FetchItem {
                id: ItemId::new("missing"),
                generation: 7,
            },
        )
        .await;
        match completion {
            Completion::ItemFetched {
                id,
                generation,
                result,
            } => {
                assert_eq!(id.as_str(), "missing");
                assert_eq!(generation, 7);
                assert!(result.is_err());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_round_trip_through_dispatcher() {
        let backend = Arc::new(FakeBackend::default());
        *backend.items.lock().unwrap() = vec![item("a"), item("b")];
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(backend.clone(), tx);
        let mut session = Session::new();

        dispatcher.dispatch(session.start());
        let loaded = next_completion(&mut rx).await;
        assert!(session.complete(loaded).is_empty());
        assert_eq!(session.phase(), &Phase::Reviewing { index: 0 });

        session.handle(Intent::SelectSuggestion {
            value: "Expenses:Food".to_string(),
        });
        dispatcher.dispatch(session.handle(Intent::Commit));
        let committed = next_completion(&mut rx).await;
        assert!(session.complete(committed).is_empty());

        assert_eq!(session.queue().len(), 1);
        assert_eq!(session.current_item().unwrap().id.as_str(), "b");
        let commits = backend.commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0.as_str(), "a");
        assert_eq!(commits[0].1.expense_account, "Expenses:Food");
    }
}
