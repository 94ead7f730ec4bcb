mod common;

use common::TestApp;
use billing_dashboard::services::InMemoryUserStore;
use std::sync::Arc;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "billing-dashboard");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;
    assert!(app.get("/ready").await.status().is_success());
}

#[tokio::test]
async fn unavailable_store_fails_health_and_readiness() {
    let app = TestApp::spawn_over(Arc::new(InMemoryUserStore::unavailable())).await;

    assert_eq!(app.get("/health").await.status().as_u16(), 503);
    assert_eq!(app.get("/ready").await.status().as_u16(), 503);
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    let app = TestApp::spawn().await;

    // Generate at least one recorded load.
    app.get("/api/users").await;

    let response = app.get("/metrics").await;
    assert!(response.status().is_success());

    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type")
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.expect("Failed to get response body");
    assert!(
        body.contains("dashboard_user_loads_total") || body.starts_with('#'),
        "Unexpected metrics format: {}",
        body
    );
}
