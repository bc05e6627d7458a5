//! Review session state machine.
//!
//! [`Session`] is a reducer: every user intent and every completed network
//! request is applied atomically, and any follow-up network work is returned
//! as [`Effect`]s for the runtime to perform.  Requests are tagged with a
//! generation per logical target so that a late response for a superseded
//! request is dropped instead of clobbering newer state.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{ClientError, CommitOutcome, CommitRequest, Snapshot};
use crate::drafts::DraftStore;
use crate::matcher::Catalog;
use crate::model::{Draft, DraftPatch, Field, Item, ItemId};
use crate::queue::Queue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Reviewing { index: usize },
    Empty,
    /// Last load failed.  The previous queue is kept for display but input is
    /// ignored until a reload succeeds.
    Error { message: String },
}

/// Closed set of things a user (or the change stream) can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Prev,
    Next,
    Commit,
    FieldInput { field: Field, value: String },
    SelectSuggestion { value: String },
    ReloadSignal,
}

/// Network work requested by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load {
        generation: u64,
    },
    FetchItem {
        id: ItemId,
        generation: u64,
    },
    Commit {
        id: ItemId,
        generation: u64,
        request: CommitRequest,
    },
}

/// Result of an [`Effect`], fed back through [`Session::complete`].
#[derive(Debug, Clone)]
pub enum Completion {
    Loaded {
        generation: u64,
        result: Result<Snapshot, ClientError>,
    },
    ItemFetched {
        id: ItemId,
        generation: u64,
        result: Result<Item, ClientError>,
    },
    Committed {
        id: ItemId,
        generation: u64,
        result: Result<CommitOutcome, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Requests rejected locally, before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("enter an account before committing")]
    EmptyAccount,
    #[error("a commit is already in progress")]
    CommitInFlight,
    #[error("nothing to commit right now")]
    NotReviewing,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Target {
    Queue,
    Item(ItemId),
    Commit(ItemId),
}

/// Latest generation issued per target.  A completion is accepted once, and
/// only if its generation is still the latest for its target.
#[derive(Debug, Default)]
struct Generations {
    counter: u64,
    latest: HashMap<Target, u64>,
}

impl Generations {
    fn issue(&mut self, target: Target) -> u64 {
        self.counter += 1;
        self.latest.insert(target, self.counter);
        self.counter
    }

    fn accept(&mut self, target: &Target, generation: u64) -> bool {
        if self.latest.get(target) == Some(&generation) {
            self.latest.remove(target);
            true
        } else {
            false
        }
    }

    fn pending(&self, target: &Target) -> bool {
        self.latest.contains_key(target)
    }

    /// Forget item fetches issued before `generation`; a snapshot requested
    /// after them already carries newer data.
    fn retire_items_before(&mut self, generation: u64) {
        self.latest
            .retain(|target, issued| !matches!(target, Target::Item(_)) || *issued > generation);
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    queue: Queue,
    catalog: Catalog,
    drafts: DraftStore,
    generations: Generations,
    committing: Option<ItemId>,
    notice: Option<Notice>,
    loaded_once: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            queue: Queue::default(),
            catalog: Catalog::default(),
            drafts: DraftStore::new(),
            generations: Generations::default(),
            committing: None,
            notice: None,
            loaded_once: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn current_item(&self) -> Option<&Item> {
        self.queue.current()
    }

    pub fn current_draft(&self) -> Option<&Draft> {
        self.queue.current_id().and_then(|id| self.drafts.get(id))
    }

    /// Whether user input is currently accepted.
    pub fn is_interactive(&self) -> bool {
        matches!(self.phase, Phase::Reviewing { .. })
    }

    pub fn is_loading(&self) -> bool {
        self.generations.pending(&Target::Queue)
    }

    pub fn is_committing(&self) -> bool {
        self.committing.is_some()
    }

    pub fn can_commit(&self) -> bool {
        self.is_interactive()
            && !self.is_committing()
            && self.current_draft().is_some_and(Draft::can_commit)
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ── Intents ─────────────────────────────────────────────────────────────

    /// Initial load.
    pub fn start(&mut self) -> Vec<Effect> {
        self.phase = Phase::Loading;
        vec![self.request_load()]
    }

    pub fn handle(&mut self, intent: Intent) -> Vec<Effect> {
        debug!(?intent, phase = ?self.phase, "session intent");

        match intent {
            Intent::ReloadSignal => {
                if matches!(self.phase, Phase::Error { .. }) {
                    self.phase = Phase::Loading;
                }
                vec![self.request_load()]
            }
            Intent::Commit if !self.is_interactive() => {
                self.notice = Some(Notice::Error(SessionError::NotReviewing.to_string()));
                Vec::new()
            }
            _ if !self.is_interactive() => Vec::new(),
            Intent::Next => {
                self.queue.next();
                self.settle();
                self.refresh_current()
            }
            Intent::Prev => {
                self.queue.prev();
                self.settle();
                self.refresh_current()
            }
            Intent::FieldInput { field, value } => {
                self.write_draft(DraftPatch::field(field, value));
                Vec::new()
            }
            Intent::SelectSuggestion { value } => {
                self.write_draft(DraftPatch::field(Field::Account, value));
                Vec::new()
            }
            Intent::Commit => match self.prepare_commit() {
                Ok(effect) => vec![effect],
                Err(err) => {
                    debug!(%err, "commit rejected locally");
                    self.notice = Some(Notice::Error(err.to_string()));
                    Vec::new()
                }
            },
        }
    }

    // ── Completions ─────────────────────────────────────────────────────────

    pub fn complete(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Loaded { generation, result } => {
                if !self.generations.accept(&Target::Queue, generation) {
                    debug!(generation, "dropping stale queue load");
                    return Vec::new();
                }
                match result {
                    Ok(snapshot) => {
                        self.generations.retire_items_before(generation);
                        self.apply_snapshot(snapshot);
                    }
                    Err(err) => {
                        warn!(%err, "queue load failed");
                        let message = format!("could not load queue: {err}");
                        self.notice = Some(Notice::Error(message.clone()));
                        self.phase = Phase::Error { message };
                    }
                }
                Vec::new()
            }
            Completion::ItemFetched {
                id,
                generation,
                result,
            } => {
                if !self.generations.accept(&Target::Item(id.clone()), generation) {
                    debug!(%id, generation, "dropping stale item fetch");
                    return Vec::new();
                }
                match result {
                    Ok(item) => {
                        if item.id != id || !self.queue.replace(item) {
                            debug!(%id, "fetched item no longer queued");
                        }
                    }
                    Err(err) => {
                        warn!(%id, %err, "item fetch failed");
                        self.notice =
                            Some(Notice::Error(format!("could not refresh transaction: {err}")));
                    }
                }
                Vec::new()
            }
            Completion::Committed {
                id,
                generation,
                result,
            } => {
                if !self.generations.accept(&Target::Commit(id.clone()), generation) {
                    debug!(%id, generation, "dropping stale commit response");
                    return Vec::new();
                }
                if self.committing.as_ref() == Some(&id) {
                    self.committing = None;
                }
                match result {
                    Ok(outcome) if outcome.ok => self.apply_commit(&id, outcome),
                    Ok(_) => {
                        warn!(%id, "server declined commit");
                        self.notice = Some(Notice::Error("commit was not accepted".to_string()));
                        Vec::new()
                    }
                    Err(err) => {
                        warn!(%id, %err, "commit failed");
                        self.notice = Some(Notice::Error(err.to_string()));
                        Vec::new()
                    }
                }
            }
        }
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn request_load(&mut self) -> Effect {
        Effect::Load {
            generation: self.generations.issue(Target::Queue),
        }
    }

    fn refresh_current(&mut self) -> Vec<Effect> {
        let Some(id) = self.queue.current_id().cloned() else {
            return Vec::new();
        };
        let generation = self.generations.issue(Target::Item(id.clone()));
        vec![Effect::FetchItem { id, generation }]
    }

    fn write_draft(&mut self, patch: DraftPatch) {
        if let Some(id) = self.queue.current_id() {
            self.drafts.set(id, patch);
        }
    }

    fn prepare_commit(&mut self) -> Result<Effect, SessionError> {
        if self.committing.is_some() {
            return Err(SessionError::CommitInFlight);
        }
        let item = self.queue.current().ok_or(SessionError::NotReviewing)?;
        let draft = self
            .drafts
            .get(&item.id)
            .filter(|draft| draft.can_commit())
            .ok_or(SessionError::EmptyAccount)?;

        let request = CommitRequest::from_draft(item, draft);
        let id = item.id.clone();
        let generation = self.generations.issue(Target::Commit(id.clone()));
        info!(%id, account = %request.expense_account, "committing");
        self.committing = Some(id.clone());
        self.notice = None;
        Ok(Effect::Commit {
            id,
            generation,
            request,
        })
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let previous_id = self.queue.current_id().cloned();
        let previous_index = self.queue.current_index();
        let Snapshot {
            items,
            current_index,
            available_accounts,
        } = snapshot;

        let index = match (&previous_id, previous_index) {
            (Some(id), Some(index)) => items
                .iter()
                .position(|item| &item.id == id)
                .unwrap_or(index),
            _ if !self.loaded_once => current_index,
            _ => 0,
        };

        self.queue = Queue::new(items, index);
        self.catalog = Catalog::new(available_accounts);
        let queue = &self.queue;
        let dropped = self.drafts.retain_ids(|id| queue.contains(id));
        if self
            .committing
            .as_ref()
            .is_some_and(|id| !self.queue.contains(id))
        {
            self.committing = None;
        }
        self.loaded_once = true;

        info!(
            items = self.queue.len(),
            accounts = self.catalog.len(),
            dropped_drafts = dropped,
            "queue loaded"
        );

        self.notice = match &previous_id {
            Some(id) if !self.queue.contains(id) && !self.queue.is_empty() => Some(Notice::Info(
                "transaction changed upstream; showing the next pending one".to_string(),
            )),
            _ => None,
        };
        self.settle();
    }

    fn apply_commit(&mut self, id: &ItemId, outcome: CommitOutcome) -> Vec<Effect> {
        self.drafts.delete(id);
        self.queue.remove(id);
        if outcome.remaining_count == 0 {
            self.queue.clear();
            self.drafts.clear();
        }
        info!(%id, remaining = outcome.remaining_count, "committed");
        self.notice = Some(Notice::Info(format!(
            "committed; {} remaining",
            outcome.remaining_count
        )));

        if !matches!(self.phase, Phase::Error { .. }) {
            self.settle();
        }

        if outcome.remaining_count != self.queue.len() {
            debug!(
                local = self.queue.len(),
                remote = outcome.remaining_count,
                "queue length disagrees with server; reloading"
            );
            return vec![self.request_load()];
        }
        Vec::new()
    }

    /// Derive the phase from the queue after a successful mutation.
    fn settle(&mut self) {
        self.phase = match self.queue.current_index() {
            Some(index) => Phase::Reviewing { index },
            None => Phase::Empty,
        };
    }
}
