mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use catalog_core::{Continuation, ScanMode, ScanRequest, ScanStop};
use catalog_engine::{
    CancellationToken, CatalogClient, ClientSettings, FailureKind, FilteredPageScanner,
    RemoteQuery, ReqwestCatalogClient,
};
use common::init_logging;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestCatalogClient {
    ReqwestCatalogClient::new(ClientSettings {
        collection_url: format!("{}/api/items/", server.uri()),
        ..ClientSettings::default()
    })
    .expect("client")
}

fn wire_item(uid: &str, class: &str) -> serde_json::Value {
    json!({
        "uid": uid,
        "primary_class_desc": class,
        "module": "math",
        "difficulty": "E",
        "stem": format!("<p>{uid}</p>"),
    })
}

#[tokio::test]
async fn fetch_initial_sends_limit_and_params() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .and(query_param("limit", "50"))
        .and(query_param("module", "math"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [wire_item("u1", "Algebra")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = RemoteQuery {
        limit: 50,
        params: BTreeMap::from([("module".to_string(), "math".to_string())]),
    };
    let page = client.fetch_initial(&query).await.expect("page");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].uid, "u1");
    assert_eq!(page.items[0].primary_class.as_deref(), Some("Algebra"));
    assert_eq!(page.items[0].stem, "<p>u1</p>");
    assert_eq!(page.continuation, None);
}

#[tokio::test]
async fn fetch_next_follows_cursor_url() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": format!("{}/api/items/?cursor=def", server.uri()),
            "results": [wire_item("u2", "Geometry")],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cursor = Continuation::new(format!("{}/api/items/?cursor=abc", server.uri()));
    let page = client.fetch_next(&cursor).await.expect("page");

    assert_eq!(page.items[0].uid, "u2");
    assert_eq!(
        page.continuation.map(|c| c.as_str().to_string()),
        Some(format!("{}/api/items/?cursor=def", server.uri()))
    );
}

#[tokio::test]
async fn http_status_is_surfaced_verbatim() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("{\"detail\": \"upstream\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_initial(&RemoteQuery {
            limit: 50,
            ..RemoteQuery::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn slow_page_times_out() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"results": [], "next": null})),
        )
        .mount(&server)
        .await;

    let client = ReqwestCatalogClient::new(ClientSettings {
        collection_url: format!("{}/api/items/", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .expect("client");
    let err = client
        .fetch_initial(&RemoteQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_page_is_rejected() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [wire_item("u1", "Algebra")],
            "next": null,
        })))
        .mount(&server)
        .await;

    let client = ReqwestCatalogClient::new(ClientSettings {
        collection_url: format!("{}/api/items/", server.uri()),
        max_page_bytes: 16,
        ..ClientSettings::default()
    })
    .expect("client");
    let err = client
        .fetch_initial(&RemoteQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[tokio::test]
async fn filtered_scan_over_http_stops_quietly_on_bad_page() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next": format!("{}/api/items/?cursor=2", server.uri()),
            "results": [wire_item("a", "Algebra"), wire_item("b", "Geometry")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/items/"))
        .and(query_param("cursor", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = ScanRequest {
        mode: ScanMode::Reset,
        filter: Some("Geometry".into()),
        page_size: 50,
        target: 50,
        scan_cap: 40,
        remote_params: BTreeMap::new(),
    };
    let batch = FilteredPageScanner::new(&client)
        .scan(&request, &CancellationToken::new())
        .await
        .expect("partial batch");

    assert_eq!(batch.items.len(), 1);
    assert_eq!(batch.items[0].uid, "b");
    assert_eq!(batch.stop, ScanStop::Interrupted);
    assert_eq!(
        batch.continuation.map(|c| c.as_str().to_string()),
        Some(format!("{}/api/items/?cursor=2", server.uri()))
    );
}
