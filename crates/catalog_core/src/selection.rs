use std::collections::BTreeMap;

use crate::CatalogItem;

/// Per-uid selection marks, kept apart from the item list itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionTracker {
    marks: BTreeMap<String, bool>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the mark for `uid` and returns the new value.
    pub fn toggle(&mut self, uid: &str) -> bool {
        let entry = self.marks.entry(uid.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn set(&mut self, uid: impl Into<String>, selected: bool) {
        self.marks.insert(uid.into(), selected);
    }

    pub fn set_all(&mut self, marks: BTreeMap<String, bool>) {
        self.marks = marks;
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn is_selected(&self, uid: &str) -> bool {
        self.marks.get(uid).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.marks.values().all(|selected| !selected)
    }

    /// Items of `items` currently marked, in list order.
    pub fn selected_items<'a>(&self, items: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
        items
            .iter()
            .filter(|item| self.is_selected(&item.uid))
            .collect()
    }
}
