use axum::http::{Method, StatusCode};
use uuid::Uuid;

use circuit_coach::auth::JwtService;

use crate::common::{send, TestApp};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), Method::GET, "/api/workouts", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_AUTH_HEADER");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), Method::GET, "/api/exercises", Some("not-a-jwt"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_token_from_another_secret_is_unauthorized() {
    let app = TestApp::new();
    let token = JwtService::new("some-other-secret").create_token(Uuid::new_v4()).unwrap();

    let (status, _) = send(app.router(), Method::GET, "/api/trisets", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "ok");
}
