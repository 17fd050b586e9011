//! Integration tests for the health probe.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_health_ok() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"], true);
    assert_eq!(response.body["database"], true);
    assert!(response.body["version"].is_string());
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let app = TestApp::with_unreachable_database();
    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["database"], false);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let response = app.request("GET", "/nope", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
