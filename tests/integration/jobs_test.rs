//! Integration tests for job lookup and queue state.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_completed_job_carries_text() {
    let app = TestApp::new();
    let id = app.enqueue("Summarize this", "PROD").await;
    app.wait_idle().await;

    let response = app.request("GET", &format!("/jobs/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "completed");
    assert_eq!(response.body["outcome"], "generated");
    assert_eq!(response.body["model"], "primary");
    assert_eq!(response.body["namespace"], "SSP-prod");
    assert_eq!(response.body["text"], "primary: Summarize this");
    assert_eq!(app.results.count_in("SSP-prod"), 1);
    assert_eq!(app.results.count_in("SSP-dev"), 0);
}

#[tokio::test]
async fn test_fallback_model_used() {
    let app = TestApp::with_failing_primary();
    let id = app.enqueue("hello", "UAT").await;
    app.wait_idle().await;

    let response = app.request("GET", &format!("/jobs/{id}"), None).await;
    assert_eq!(response.body["outcome"], "generated");
    assert_eq!(response.body["model"], "fallback");
    assert_eq!(response.body["text"], "fallback: hello");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = TestApp::new();
    let id = uuid::Uuid::new_v4();
    let response = app.request("GET", &format!("/jobs/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_job_id_rejected() {
    let app = TestApp::new();
    let response = app.request("GET", "/jobs/not-a-uuid", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_queue_is_empty_after_drain() {
    let app = TestApp::new();
    app.enqueue("one", "UAT").await;
    app.enqueue("two", "UAT").await;
    app.wait_idle().await;

    let response = app.request("GET", "/queue", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["queued"], 0);
    assert_eq!(response.body["in_flight"], 0);
    assert_eq!(response.body["worker_running"], false);
}
