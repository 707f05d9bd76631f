#![allow(dead_code)]

use catalog_core::{
    update, BrowserState, CatalogItem, Continuation, Effect, Msg, OpId, ScanBatch, ScanRequest,
    ScanStop,
};

pub fn init_logging() {
    catalog_logging::initialize_for_tests();
}

pub fn item(uid: &str, class: &str) -> CatalogItem {
    CatalogItem {
        uid: uid.to_string(),
        primary_class: Some(class.to_string()),
        module: Some("math".to_string()),
        difficulty: Some("E".to_string()),
        stem: format!("<p>{uid}</p>"),
    }
}

pub fn items(prefix: &str, count: usize, class: &str) -> Vec<CatalogItem> {
    (0..count).map(|i| item(&format!("{prefix}{i}"), class)).collect()
}

pub fn batch(items: Vec<CatalogItem>, next: Option<&str>) -> ScanBatch {
    ScanBatch {
        items,
        continuation: next.map(Continuation::new),
        stop: if next.is_some() {
            ScanStop::TargetReached
        } else {
            ScanStop::Exhausted
        },
        pages_fetched: 1,
    }
}

pub fn started_scan(effects: &[Effect]) -> (OpId, ScanRequest) {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartScan { scan_id, request } => Some((*scan_id, request.clone())),
            _ => None,
        })
        .expect("start scan effect")
}

pub fn started_build(effects: &[Effect]) -> OpId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::BuildIndex { build_id, .. } => Some(*build_id),
            _ => None,
        })
        .expect("build index effect")
}

/// Mounts a fresh state and lands its first reset scan with `first`.
pub fn mounted_with(first: ScanBatch) -> BrowserState {
    let (state, effects) = update(BrowserState::new(), Msg::Mounted);
    let (scan_id, _) = started_scan(&effects);
    let (state, _) = update(
        state,
        Msg::ScanCompleted {
            scan_id,
            result: Ok(first),
        },
    );
    state
}

pub fn uids(state: &BrowserState) -> Vec<String> {
    state.items().iter().map(|item| item.uid.clone()).collect()
}
