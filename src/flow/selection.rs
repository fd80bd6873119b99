//! Client-side content selection set.

use std::collections::HashSet;

use uuid::Uuid;

use crate::api::types::ContentItem;

/// Which of a project's content items go into the narrative.
///
/// Tracks the known item ids in fetch order so `select_all` and
/// `inclusion_updates` are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSelection {
    order: Vec<Uuid>,
    selected: HashSet<Uuid>,
}

impl ContentSelection {
    /// Everything starts selected.
    #[must_use]
    pub fn from_items(items: &[ContentItem]) -> Self {
        let order: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let selected = order.iter().copied().collect();
        Self { order, selected }
    }

    pub fn select_all(&mut self) {
        self.selected = self.order.iter().copied().collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// Flip one item. Unknown ids are ignored. Returns the new membership.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if !self.order.contains(&id) {
            return false;
        }
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: Uuid, included: bool) {
        if !self.order.contains(&id) {
            return;
        }
        if included {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// One `(item, included)` pair per item, in item order.
    #[must_use]
    pub fn inclusion_updates(&self, items: &[ContentItem]) -> Vec<(Uuid, bool)> {
        items.iter().map(|item| (item.id, self.is_selected(item.id))).collect()
    }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;
