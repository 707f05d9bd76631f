mod common;

use std::collections::BTreeMap;

use catalog_core::IndexRequest;
use catalog_engine::{CancellationToken, FailureKind, FilterValueIndex};
use common::*;
use pretty_assertions::assert_eq;

fn request(scan_cap: u32) -> IndexRequest {
    IndexRequest {
        page_size: 200,
        scan_cap,
        remote_params: BTreeMap::new(),
    }
}

fn mixed_pages() -> Vec<Vec<catalog_core::CatalogItem>> {
    vec![
        vec![item("a", Some("Algebra")), item("b", None), item("c", Some("  "))],
        vec![item("d", Some(" Geometry")), item("e", Some("Algebra "))],
        vec![item("f", Some("Statistics"))],
        vec![item("g", Some("Advanced Math")), item("h", None)],
        vec![item("i", Some("Geometry"))],
    ]
}

#[tokio::test]
async fn scenario_c_full_scan_yields_exact_sorted_set() {
    init_logging();
    let catalog = FakeCatalog::new(mixed_pages());
    let token = CancellationToken::new();

    let outcome = FilterValueIndex::new(&catalog)
        .build(&request(200), &token)
        .await
        .expect("build ok");

    assert_eq!(
        outcome.values,
        vec!["Advanced Math", "Algebra", "Geometry", "Statistics"]
    );
    assert_eq!(outcome.pages_scanned, 5);
    assert!(outcome.complete);
    assert_eq!(catalog.requests()[0], "initial limit=200");
}

#[tokio::test]
async fn capped_build_is_a_lower_bound() {
    init_logging();
    let catalog = FakeCatalog::new(mixed_pages());
    let token = CancellationToken::new();

    let outcome = FilterValueIndex::new(&catalog)
        .build(&request(2), &token)
        .await
        .expect("build ok");

    assert_eq!(outcome.values, vec!["Algebra", "Geometry"]);
    assert_eq!(outcome.pages_scanned, 2);
    assert_eq!(catalog.request_count(), 2);
    assert!(!outcome.complete);
}

#[tokio::test]
async fn cancelled_build_commits_nothing() {
    init_logging();
    let token = CancellationToken::new();
    let catalog = FakeCatalog::new(mixed_pages()).cancelling_at(2, token.clone());

    let err = FilterValueIndex::new(&catalog)
        .build(&request(200), &token)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Cancelled);
    assert_eq!(catalog.request_count(), 3);
}

#[tokio::test]
async fn first_page_failure_is_reported() {
    init_logging();
    let catalog = FakeCatalog::new(mixed_pages()).failing_at(0, FailureKind::HttpStatus(503));
    let token = CancellationToken::new();

    let err = FilterValueIndex::new(&catalog)
        .build(&request(200), &token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn later_page_failure_keeps_what_was_seen() {
    init_logging();
    let catalog = FakeCatalog::new(mixed_pages()).failing_at(2, FailureKind::Timeout);
    let token = CancellationToken::new();

    let outcome = FilterValueIndex::new(&catalog)
        .build(&request(200), &token)
        .await
        .expect("partial build ok");

    assert_eq!(outcome.values, vec!["Algebra", "Geometry"]);
    assert!(!outcome.complete);
}
