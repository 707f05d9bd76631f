use crate::{DifficultyBand, Phase};

/// Snapshot of everything the presentation layer draws.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowserViewModel {
    pub filter: Option<String>,
    pub items: Vec<ItemRowView>,
    pub phase: Phase,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_count: usize,
    pub can_load_more: bool,
    pub filter_values: Vec<String>,
    pub building_index: bool,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub uid: String,
    pub primary_class: Option<String>,
    pub module: Option<String>,
    pub difficulty: DifficultyBand,
    pub stem: String,
    pub selected: bool,
}
