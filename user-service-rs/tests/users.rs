//! User route behavior.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use service_core::sink::MemorySink;
use service_core::{register, AppContext};

use user_service::{MemoryUserRepository, UserHandler, UserService};

fn build_app(sink: Arc<MemorySink>) -> Router {
    let app_context = AppContext::new("user-service", sink);
    let service = Arc::new(UserService::new(Arc::new(MemoryUserRepository::seeded())));
    register("/users", UserHandler::routes(service), app_context)
}

async fn send(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-transaction-id", "txn-users")
        .body(Body::empty())
        .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

#[tokio::test]
async fn test_listing_returns_the_seeded_directory() {
    let router = build_app(MemorySink::new());

    let (status, body) = send(&router, "/users").await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().expect("data array");
    assert_eq!(data.len(), 3);
    assert!(data.iter().any(|user| user["id"] == "admin"));
}

#[tokio::test]
async fn test_lookup_by_id_and_not_found() {
    let router = build_app(MemorySink::new());

    let (status, body) = send(&router, "/users/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "admin");

    let (status, body) = send(&router, "/users/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "user not found");
}

#[tokio::test]
async fn test_each_request_flushes_its_own_records() {
    let sink = MemorySink::new();
    let router = build_app(sink.clone());

    send(&router, "/users").await;
    send(&router, "/users/admin").await;

    let records = sink.records();
    let details = records
        .iter()
        .filter(|record| record["type"] == "detail")
        .count();
    let summaries = records
        .iter()
        .filter(|record| record["type"] == "summary")
        .count();
    assert_eq!(details, 2);
    assert_eq!(summaries, 2);

    let first_detail = records
        .iter()
        .find(|record| record["type"] == "detail")
        .unwrap();
    assert_eq!(first_detail["transaction_id"], "txn-users");
}
