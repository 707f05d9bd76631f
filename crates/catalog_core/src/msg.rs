use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The browsing view became visible.
    Mounted,
    /// The browsing view went away; in-flight work must not land afterwards.
    Unmounted,
    /// User changed the filter selector (raw, not yet quiescent).
    FilterInput {
        value: Option<String>,
        at: Instant,
    },
    /// Clock tick used to release a quiescent filter value.
    Tick { now: Instant },
    /// User clicked Refresh.
    RefreshClicked,
    /// User clicked Load more.
    LoadMoreClicked,
    /// User toggled the checkbox of a visible item.
    SelectionToggled { uid: String },
    /// Replace every selection mark at once.
    SelectionReplaced(BTreeMap<String, bool>),
    /// Mark every visible item as selected.
    SelectAllVisible,
    /// Engine finished a filtered scan.
    ScanCompleted {
        scan_id: crate::OpId,
        result: Result<crate::ScanBatch, String>,
    },
    /// Engine finished building the filter value index.
    IndexBuilt {
        build_id: crate::OpId,
        result: Result<Vec<String>, String>,
    },
}
