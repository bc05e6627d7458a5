use std::collections::HashMap;

use crate::model::{Draft, DraftPatch, ItemId};

/// Unsaved edits keyed by item id.  Only the session mutates this, and only
/// for the item currently under review.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    drafts: HashMap<ItemId, Draft>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Draft> {
        self.drafts.get(id)
    }

    /// Merge `patch` into the draft for `id`, creating it on first use.
    pub fn set(&mut self, id: &ItemId, patch: DraftPatch) -> &Draft {
        let draft = self.drafts.entry(id.clone()).or_default();
        draft.apply(patch);
        draft
    }

    pub fn delete(&mut self, id: &ItemId) -> Option<Draft> {
        self.drafts.remove(id)
    }

    /// Drop every draft whose id is not accepted by `keep`.  Returns how many
    /// were discarded.
    pub fn retain_ids(&mut self, mut keep: impl FnMut(&ItemId) -> bool) -> usize {
        let before = self.drafts.len();
        self.drafts.retain(|id, _| keep(id));
        before - self.drafts.len()
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
