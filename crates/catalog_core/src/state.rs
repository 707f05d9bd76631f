use std::collections::{BTreeSet, HashSet};

use catalog_logging::{catalog_debug, catalog_warn};

use crate::view_model::{BrowserViewModel, ItemRowView};
use crate::{
    BrowserSettings, CatalogItem, Continuation, IndexRequest, OpId, QuiescenceGate, ScanBatch,
    ScanMode, ScanRequest, SelectionTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Reset,
    Extend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading(LoadKind),
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveScan {
    id: OpId,
    kind: LoadKind,
}

/// Discovered primary-class values for the filter selector.
///
/// When a build stops at its page cap the values are a lower bound on the
/// classes present in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterIndexState {
    values: Vec<String>,
    building: bool,
    active_build: Option<OpId>,
}

impl FilterIndexState {
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_building(&self) -> bool {
        self.building
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    settings: BrowserSettings,
    gate: QuiescenceGate<Option<String>>,
    filter: Option<String>,
    items: Vec<CatalogItem>,
    continuation: Option<Continuation>,
    phase: Phase,
    error: Option<String>,
    selection: SelectionTracker,
    index: FilterIndexState,
    active_scan: Option<ActiveScan>,
    next_op_id: OpId,
    mounted: bool,
    dirty: bool,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::with_settings(BrowserSettings::default())
    }
}

impl BrowserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: BrowserSettings) -> Self {
        Self {
            gate: QuiescenceGate::new(settings.quiescence_delay),
            settings,
            filter: None,
            items: Vec::new(),
            continuation: None,
            phase: Phase::Idle,
            error: None,
            selection: SelectionTracker::new(),
            index: FilterIndexState::default(),
            active_scan: None,
            next_op_id: 1,
            mounted: false,
            dirty: false,
        }
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn continuation(&self) -> Option<&Continuation> {
        self.continuation.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.active_scan.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn index(&self) -> &FilterIndexState {
        &self.index
    }

    pub fn active_scan_id(&self) -> Option<OpId> {
        self.active_scan.map(|scan| scan.id)
    }

    pub fn can_load_more(&self) -> bool {
        self.continuation.is_some() && !self.is_loading()
    }

    /// Visible items currently marked selected, in list order.
    pub fn selected_items(&self) -> Vec<CatalogItem> {
        self.selection
            .selected_items(&self.items)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn view(&self) -> BrowserViewModel {
        let loading = self.is_loading();
        let rows: Vec<ItemRowView> = self
            .items
            .iter()
            .map(|item| ItemRowView {
                uid: item.uid.clone(),
                primary_class: item.primary_class_key().map(str::to_string),
                module: item.module.clone(),
                difficulty: item.difficulty_band(),
                stem: item.stem.clone(),
                selected: self.selection.is_selected(&item.uid),
            })
            .collect();
        let selected_count = rows.iter().filter(|row| row.selected).count();
        let empty_message = if rows.is_empty() && !loading {
            Some(match self.filter.as_deref() {
                Some(filter) => format!("No items found for \"{filter}\"."),
                None => "No items found.".to_string(),
            })
        } else {
            None
        };

        BrowserViewModel {
            filter: self.filter.clone(),
            items: rows,
            phase: self.phase,
            loading,
            error: self.error.clone(),
            selected_count,
            can_load_more: self.can_load_more(),
            filter_values: self.index.values.clone(),
            building_index: self.index.building,
            empty_message,
        }
    }

    /// Returns whether anything changed since the last call, and resets it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    pub(crate) fn gate_mut(&mut self) -> &mut QuiescenceGate<Option<String>> {
        &mut self.gate
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionTracker {
        &mut self.selection
    }

    fn allocate_op_id(&mut self) -> OpId {
        let id = self.next_op_id;
        self.next_op_id += 1;
        id
    }

    /// Makes a fresh reset scan authoritative. Returns the superseded scan id,
    /// if any, alongside the new scan id and its request.
    pub(crate) fn begin_reset(&mut self) -> (Option<OpId>, OpId, ScanRequest) {
        let superseded = self.active_scan.take().map(|scan| scan.id);
        let id = self.allocate_op_id();
        self.active_scan = Some(ActiveScan {
            id,
            kind: LoadKind::Reset,
        });
        self.phase = Phase::Loading(LoadKind::Reset);
        self.error = None;
        self.dirty = true;

        let request = ScanRequest {
            mode: ScanMode::Reset,
            filter: self.filter.clone(),
            page_size: self.settings.page_size,
            target: self.settings.page_size as usize,
            scan_cap: self.settings.filter_scan_cap,
            remote_params: self.settings.remote_params.clone(),
        };
        (superseded, id, request)
    }

    /// Starts a "load more" scan, unless one is impossible right now.
    pub(crate) fn begin_extend(&mut self) -> Option<(OpId, ScanRequest)> {
        if self.is_loading() {
            return None;
        }
        let continuation = self.continuation.clone()?;
        let id = self.allocate_op_id();
        self.active_scan = Some(ActiveScan {
            id,
            kind: LoadKind::Extend,
        });
        self.phase = Phase::Loading(LoadKind::Extend);
        self.dirty = true;

        let request = ScanRequest {
            mode: ScanMode::Extend(continuation),
            filter: self.filter.clone(),
            page_size: self.settings.page_size,
            target: self.settings.load_more_target,
            scan_cap: self.settings.filter_scan_cap,
            remote_params: self.settings.remote_params.clone(),
        };
        Some((id, request))
    }

    pub(crate) fn begin_index_build(&mut self) -> (Option<OpId>, OpId, IndexRequest) {
        let superseded = self.index.active_build.take();
        let id = self.allocate_op_id();
        self.index.active_build = Some(id);
        self.index.building = true;
        self.dirty = true;

        let request = IndexRequest {
            page_size: self.settings.index_page_size,
            scan_cap: self.settings.index_scan_cap,
            remote_params: self.settings.remote_params.clone(),
        };
        (superseded, id, request)
    }

    /// Drops authority over every in-flight operation, returning their ids.
    pub(crate) fn abandon_operations(&mut self) -> (Option<OpId>, Option<OpId>) {
        let scan = self.active_scan.take().map(|scan| scan.id);
        let build = self.index.active_build.take();
        self.index.building = false;
        if matches!(self.phase, Phase::Loading(_)) {
            self.phase = if self.error.is_some() {
                Phase::Error
            } else if self.items.is_empty() && self.continuation.is_none() {
                Phase::Idle
            } else {
                Phase::Ready
            };
        }
        self.gate.clear();
        self.dirty = true;
        (scan, build)
    }

    /// Applies a scan completion if `scan_id` is still authoritative.
    /// Returns false when the result was discarded.
    pub(crate) fn complete_scan(&mut self, scan_id: OpId, result: Result<ScanBatch, String>) -> bool {
        let Some(active) = self.active_scan else {
            return false;
        };
        if active.id != scan_id {
            return false;
        }
        self.active_scan = None;
        self.dirty = true;

        match result {
            Ok(batch) => {
                match active.kind {
                    LoadKind::Reset => {
                        self.items = dedupe_batch(batch.items, &HashSet::new());
                        self.selection.clear();
                    }
                    LoadKind::Extend => {
                        let seen: HashSet<String> =
                            self.items.iter().map(|item| item.uid.clone()).collect();
                        let fresh = dedupe_batch(batch.items, &seen);
                        self.items.extend(fresh);
                    }
                }
                self.continuation = batch.continuation;
                self.error = None;
                self.phase = Phase::Ready;
            }
            Err(message) => {
                self.error = Some(message);
                self.phase = Phase::Error;
            }
        }
        true
    }

    /// Applies an index build completion if `build_id` is still authoritative.
    /// A failed build keeps the previous values.
    pub(crate) fn complete_index_build(
        &mut self,
        build_id: OpId,
        result: Result<Vec<String>, String>,
    ) -> bool {
        if self.index.active_build != Some(build_id) {
            return false;
        }
        self.index.active_build = None;
        self.index.building = false;
        self.dirty = true;
        match result {
            Ok(values) => {
                let sorted: BTreeSet<String> = values
                    .into_iter()
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .collect();
                self.index.values = sorted.into_iter().collect();
            }
            Err(message) => {
                catalog_warn!("filter index build {} failed: {}", build_id, message);
            }
        }
        true
    }
}

/// Keeps the first occurrence of every uid not already in `seen`.
fn dedupe_batch(items: Vec<CatalogItem>, seen: &HashSet<String>) -> Vec<CatalogItem> {
    let total = items.len();
    let mut taken: HashSet<String> = HashSet::with_capacity(total);
    let kept: Vec<CatalogItem> = items
        .into_iter()
        .filter(|item| !seen.contains(&item.uid) && taken.insert(item.uid.clone()))
        .collect();
    if kept.len() != total {
        catalog_debug!("dropped {} duplicate item(s) from batch", total - kept.len());
    }
    kept
}
