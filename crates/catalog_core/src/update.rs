use catalog_logging::{catalog_debug, catalog_info};

use crate::{normalize_filter, BrowserState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: BrowserState, msg: Msg) -> (BrowserState, Vec<Effect>) {
    if !state.is_mounted() && starts_work(&msg) {
        catalog_debug!("ignoring {:?} while unmounted", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Mounted => {
            state.set_mounted(true);
            full_reset(&mut state)
        }
        Msg::Unmounted => {
            state.set_mounted(false);
            let (scan, build) = state.abandon_operations();
            let mut effects = Vec::new();
            if let Some(scan_id) = scan {
                effects.push(Effect::CancelScan { scan_id });
            }
            if let Some(build_id) = build {
                effects.push(Effect::CancelIndexBuild { build_id });
            }
            effects
        }
        Msg::FilterInput { value, at } => {
            state.gate_mut().input(value, at);
            Vec::new()
        }
        Msg::Tick { now } => match state.gate_mut().poll(now) {
            Some(raw) => {
                let filter = normalize_filter(raw);
                if filter.as_deref() == state.filter() {
                    Vec::new()
                } else {
                    catalog_info!("filter changed to {:?}", filter);
                    state.set_filter(filter);
                    full_reset(&mut state)
                }
            }
            None => Vec::new(),
        },
        Msg::RefreshClicked => full_reset(&mut state),
        Msg::LoadMoreClicked => match state.begin_extend() {
            Some((scan_id, request)) => vec![Effect::StartScan { scan_id, request }],
            None => Vec::new(),
        },
        Msg::SelectionToggled { uid } => {
            state.selection_mut().toggle(&uid);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectionReplaced(marks) => {
            state.selection_mut().set_all(marks);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectAllVisible => {
            let uids: Vec<String> = state.items().iter().map(|item| item.uid.clone()).collect();
            for uid in uids {
                state.selection_mut().set(uid, true);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ScanCompleted { scan_id, result } => {
            if !state.complete_scan(scan_id, result) {
                catalog_debug!("discarding result of superseded scan {}", scan_id);
            }
            Vec::new()
        }
        Msg::IndexBuilt { build_id, result } => {
            if !state.complete_index_build(build_id, result) {
                catalog_debug!("discarding result of superseded index build {}", build_id);
            }
            Vec::new()
        }
    };

    (state, effects)
}

/// Messages that may start remote work; none of them apply to an unmounted view.
fn starts_work(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::FilterInput { .. } | Msg::Tick { .. } | Msg::RefreshClicked | Msg::LoadMoreClicked
    )
}

/// Supersedes any in-flight work and starts a reset scan plus an index build.
fn full_reset(state: &mut BrowserState) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(4);

    let (superseded_build, build_id, index_request) = state.begin_index_build();
    if let Some(build_id) = superseded_build {
        effects.push(Effect::CancelIndexBuild { build_id });
    }
    effects.push(Effect::BuildIndex {
        build_id,
        request: index_request,
    });

    let (superseded_scan, scan_id, request) = state.begin_reset();
    if let Some(scan_id) = superseded_scan {
        effects.push(Effect::CancelScan { scan_id });
    }
    effects.push(Effect::StartScan { scan_id, request });

    effects
}
