//! Integration tests for prompt submission.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{MAX_PROMPT_CHARS, TestApp};

#[tokio::test]
async fn test_enqueue_acknowledges() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/enqueue",
            Some(json!({ "prompt": "Write a haiku", "environment": "PROD" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["message"], "Prompt added to queue.");
    assert_eq!(response.body["environment"], "PROD");
    assert_eq!(response.body["namespace"], "SSP-prod");
    assert!(response.body["job_id"].is_string());
}

#[tokio::test]
async fn test_environment_mapping() {
    let app = TestApp::new();

    for (token, namespace) in [
        (json!("UAT"), "SSP-dev"),
        (json!("PROD"), "SSP-prod"),
        (json!("staging"), "SSP-dev"),
        (json!(""), "SSP-dev"),
    ] {
        let response = app
            .request(
                "POST",
                "/enqueue",
                Some(json!({ "prompt": "p", "environment": token })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["namespace"], namespace, "token {token}");
    }
}

#[tokio::test]
async fn test_missing_environment_defaults_to_uat() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/enqueue", Some(json!({ "prompt": "p" })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["environment"], "UAT");
}

#[tokio::test]
async fn test_empty_prompt_rejected() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/enqueue",
            Some(json!({ "prompt": "", "environment": "UAT" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_whitespace_prompt_rejected() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/enqueue", Some(json!({ "prompt": "   " })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_prompt_rejected() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/enqueue", Some(json!({ "environment": "UAT" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = TestApp::new();
    let response = app
        .raw_request("POST", "/enqueue", "{not json".to_string())
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_oversized_prompt_rejected() {
    let app = TestApp::new();
    let prompt = "x".repeat(MAX_PROMPT_CHARS as usize + 1);
    let response = app
        .request("POST", "/enqueue", Some(json!({ "prompt": prompt })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_burst_is_processed_exactly_once() {
    let app = TestApp::new();

    let mut ids = Vec::new();
    for i in 0..20 {
        ids.push(app.enqueue(&format!("prompt {i}"), "UAT").await);
    }
    app.wait_idle().await;

    assert_eq!(app.results.len(), 20);
    for id in ids {
        let response = app.request("GET", &format!("/jobs/{id}"), None).await;
        assert_eq!(response.body["status"], "completed");
    }
}
