//! Integration tests for the storefront API
//!
//! These tests drive the full router against a temporary redb file:
//! - HTTP routing
//! - Request/response handling
//! - Catalog, pricing and ledger operations
//! - Error mapping

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use boostdesk::bootstrap::bootstrap;
use boostdesk::database::{AppState, RedbStore};
use boostdesk::route::create_app;

/// Creates a bootstrapped application backed by a temporary database
fn setup_test_app() -> (axum::Router, AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_db.path().to_str().unwrap();

    let store = RedbStore::open(db_path).expect("Failed to initialize test database");
    let state = AppState::new(Arc::new(store));
    bootstrap(&state.catalog, &["instagram"]).expect("Bootstrap failed");

    (create_app(state.clone()), state, temp_db)
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn order_payload() -> Value {
    json!({
        "customerName": "Jamie Doe",
        "customerEmail": "jamie@example.com",
        "service": "Instagram Followers",
        "platform": "instagram",
        "accountUrl": "https://instagram.com/jamie",
        "paymentMethod": "paypal",
        "amount": 12.5,
        "currency": "USD",
        "quantity": 250
    })
}

#[tokio::test]
async fn test_health_reports_ready() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_list_seeded_platforms() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(get("/api/platforms")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    let platforms = body.as_array().unwrap();
    assert_eq!(platforms.len(), 9);
    assert_eq!(platforms[0]["slug"], "instagram");
    assert_eq!(platforms[0]["id"], "instagram-default");
    assert!(platforms[0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_get_platform_not_found() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app.oneshot(get("/api/platforms/myspace")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_create_platform_and_duplicate() {
    let (app, _state, _temp_db) = setup_test_app();
    let payload = json!({ "slug": "Threads", "name": "Threads", "type": "social" });

    let response = app
        .clone()
        .oneshot(post_json("/api/platforms", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["slug"], "threads");

    let response = app
        .clone()
        .oneshot(post_json("/api/platforms", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get("/api/platforms/threads")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_platform_invalid_slug() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .oneshot(post_json("/api/platforms", &json!({ "slug": "two words", "name": "X" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_services_active_only_hides_orphans() {
    let (app, _state, _temp_db) = setup_test_app();

    for payload in [
        json!({ "id": 1, "name": "IG Followers", "type": "followers",
                "platformId": "instagram-default", "price": 0.05 }),
        json!({ "id": 2, "name": "Ghost Likes", "type": "likes",
                "platformId": "ghost-platform", "price": 0.02 }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/services", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/api/services?active_only=true"))
        .await
        .unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 1);

    let response = app.oneshot(get("/api/services")).await.unwrap();
    let body = response_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_service_with_numeric_text_id() {
    let (app, _state, _temp_db) = setup_test_app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/services",
            &json!({ "id": "7", "platformId": "instagram-default", "price": 1.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get("/api/services/7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["id"], "7");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/services",
            &json!({ "id": 7, "platformId": "instagram-default", "price": 2.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get("/api/services/8")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quote_catalog_service() {
    let (app, _state, _temp_db) = setup_test_app();
    app.clone()
        .oneshot(post_json(
            "/api/services",
            &json!({ "id": "ig-f", "platformId": "instagram-default", "price": 5.0 }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/api/quote",
            &json!({ "source": "catalog", "serviceId": "ig-f", "quantity": 50 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["display"], "500.00");
    assert_eq!(body["quantity"], 100);
    assert_eq!(body["clamped"], true);
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn test_quote_demo_uses_platform_factor() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/quote",
            &json!({ "source": "demo", "serviceType": "followers", "platform": "youtube",
                     "quantity": 1000, "currency": "USD" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response.into_body()).await;
    assert_eq!(body["display"], "65.00");
    assert_eq!(body["clamped"], false);
}

#[tokio::test]
async fn test_quote_unknown_currency() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/quote",
            &json!({ "source": "demo", "serviceType": "likes", "platform": "tiktok",
                     "quantity": 100, "currency": "XYZ" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_lifecycle() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/orders", &order_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response.into_body()).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "processing");

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/orders/{}/status", id),
            &json!({ "status": "completed", "transactionId": "TXN1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/orders/{}", id)))
        .await
        .unwrap();
    let order = response_json(response.into_body()).await;
    assert_eq!(order["status"], "completed");
    assert_eq!(order["transactionId"], "TXN1");

    // Completed orders cannot move again
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/orders/{}/status", id),
            &json!({ "status": "processing" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get("/api/dashboard/summary")).await.unwrap();
    let summary = response_json(response.into_body()).await;
    assert_eq!(summary["orders"]["completed"], 1);
    assert_eq!(summary["orders"]["revenue"]["USD"], 12.5);
    assert_eq!(summary["currentOrderId"], id.as_str());
}

#[tokio::test]
async fn test_status_update_unknown_order() {
    let (app, _state, _temp_db) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/orders/TX000000001/status",
            &json!({ "status": "completed" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_clears_catalog() {
    let (app, state, _temp_db) = setup_test_app();
    let mut events = state.catalog.subscribe();

    let response = app
        .clone()
        .oneshot(post_json("/api/admin/reset", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(events.recv().await.is_ok());

    let response = app.oneshot(get("/api/platforms")).await.unwrap();
    let body = response_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}
