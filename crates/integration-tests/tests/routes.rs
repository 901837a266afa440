//! Public routes that need no signed-in user.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use recipe_box_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_signed_out_visitor_gets_login_page() {
    let mut app = TestApp::new();

    let page = app.get("/").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Login"));
    assert!(page.body.contains("id=\"login-container\""));
    assert!(page.body.contains("action=\"/auth/login\""));
    assert!(!page.body.contains("Add Recipe"));
}

#[tokio::test]
async fn test_login_page_shows_error_code() {
    let mut app = TestApp::new();

    let page = app.get("/?error=credentials").await;

    assert!(page.body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_logout_without_session_goes_to_gate() {
    let mut app = TestApp::new();

    let response = app.post_form("/auth/logout", &[]).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let mut app = TestApp::new();

    let response = app.get("/health").await;

    assert!(response.request_id.is_some());
}
