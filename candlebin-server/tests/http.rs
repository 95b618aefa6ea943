use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use candlebin::{Candlebin, FsArtifactStore};
use candlebin_mock::MockStore;
use candlebin_server::{AppState, app};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    app: Router,
    store: Arc<MockStore>,
    dir: TempDir,
}

fn harness_with(store_timeout: Duration) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MockStore::new());
    let bin = Candlebin::builder()
        .with_store(store.clone())
        .with_catalog(store.clone())
        .with_artifacts(Arc::new(FsArtifactStore::new(dir.path())))
        .store_timeout(store_timeout)
        .build()
        .unwrap();
    let state = Arc::new(AppState::new(bin, dir.path()));
    Harness {
        app: app(state),
        store,
        dir,
    }
}

fn harness() -> Harness {
    harness_with(Duration::from_secs(5))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn error_of(body: &str) -> String {
    let v: Value = serde_json::from_str(body).unwrap();
    v["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn export_returns_public_path_and_writes_artifact() {
    let h = harness();
    let (status, body) = get(&h.app, "/?Ticker=aapl&Time=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "data/AAPL-3.csv");
    assert!(h.dir.path().join("AAPL-3.csv").exists());
}

#[tokio::test]
async fn defaults_are_aapl_one_minute() {
    let h = harness();
    let (status, body) = get(&h.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "data/AAPL-1.csv");
}

#[tokio::test]
async fn produced_artifact_is_served_under_data() {
    let h = harness();
    let (_, path) = get(&h.app, "/?Ticker=MSFT&Time=1440").await;
    let (status, csv) = get(&h.app, &format!("/{path}")).await;
    assert_eq!(status, StatusCode::OK);
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Date,open,high,low,close,volume"));
    assert_eq!(
        lines.next(),
        Some("2024-03-04,413.44,417.35,412.32,414.92,17596000")
    );
}

#[tokio::test]
async fn repeated_export_hits_the_store_once() {
    let h = harness();
    for _ in 0..3 {
        let (status, _) = get(&h.app, "/?Ticker=AAPL&Time=5").await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(h.store.fetch_count(), 1);
}

#[tokio::test]
async fn client_mistakes_are_400() {
    let h = harness();

    let (status, body) = get(&h.app, "/?Ticker=NOPE&Time=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "unknown_symbol: NOPE");

    for bad in ["0", "-5", "1.5", "abc"] {
        let (status, body) = get(&h.app, &format!("/?Ticker=AAPL&Time={bad}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "Time={bad}");
        assert!(error_of(&body).starts_with("invalid_interval: "), "{body}");
    }

    let (status, body) = get(&h.app, "/?Ticker=..%2Fetc&Time=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).starts_with("invalid_argument: "));

    assert_eq!(h.store.fetch_count(), 0);
}

#[tokio::test]
async fn oversized_interval_is_400() {
    let h = harness();
    let (status, body) = get(&h.app, "/?Ticker=AAPL&Time=200000000000000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).starts_with("invalid_interval: "), "{body}");
    assert_eq!(h.store.fetch_count(), 0);
}

#[tokio::test]
async fn malformed_query_string_gets_a_json_error() {
    let h = harness();
    let (status, body) = get(&h.app, "/?Ticker=AAPL&Ticker=MSFT&Time=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).starts_with("invalid_argument: "), "{body}");
    assert_eq!(h.store.fetch_count(), 0);
}

#[tokio::test]
async fn store_failures_are_500_without_details() {
    let h = harness();
    let (status, body) = get(&h.app, "/?Ticker=FAIL&Time=5").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_of(&body), "store_error: internal error");
    assert!(!body.contains("forced failure"));
    assert!(!body.contains("candlebin-mock"));
    assert!(!h.dir.path().join("FAIL-5.csv").exists());
}

#[tokio::test]
async fn store_timeouts_are_504() {
    let h = harness_with(Duration::from_millis(20));
    let (status, body) = get(&h.app, "/?Ticker=SLOW&Time=1").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(error_of(&body), "store_timeout: upstream timed out");
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();
    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "ok");
}

#[tokio::test]
async fn cors_is_permissive() {
    let h = harness();
    let res = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://chart.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
