use crate::model::{Item, ItemId};

/// Items awaiting review plus the cursor of the one being shown.
///
/// `current < items.len()` holds whenever the queue is non-empty; the cursor
/// is meaningless otherwise.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    items: Vec<Item>,
    current: usize,
}

impl Queue {
    pub fn new(items: Vec<Item>, current: usize) -> Self {
        let current = current.min(items.len().saturating_sub(1));
        Self { items, current }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<&Item> {
        self.items.get(self.current)
    }

    pub fn current_id(&self) -> Option<&ItemId> {
        self.current().map(|item| &item.id)
    }

    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.current = (self.current + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.current = self
                .current
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    /// Remove the item with `id`, keeping the cursor on the same item when
    /// it survives and on the following one (clamped) when it was removed.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let position = self.position_of(id)?;
        let removed = self.items.remove(position);
        if position < self.current {
            self.current -= 1;
        }
        self.current = self.current.min(self.items.len().saturating_sub(1));
        Some(removed)
    }

    /// Swap in a fresher copy of an item already in the queue.
    pub fn replace(&mut self, item: Item) -> bool {
        match self.position_of(&item.id) {
            Some(position) => {
                self.items[position] = item;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.current = 0;
    }
}
