//! Session token handling against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use fuelops_admin::api::ApiError;
use fuelops_admin::session::{MemoryTokenStore, TokenStore};
use fuelops_integration_tests::{MockBackend, MockResponse};
use secrecy::SecretString;
use serde_json::json;

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/api/auth/me",
        MockResponse::json(json!({ "id": 7, "username": "dispatch", "email": "dispatch@depot.ma" })),
    );
    let api = backend.client(Arc::new(MemoryTokenStore::with_token("t0k3n")));

    let user = api.current_user().await.unwrap();
    assert_eq!(user.username.as_deref(), Some("dispatch"));

    let requests = backend.requests_to("GET", "/api/auth/me");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer t0k3n"));
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let backend = MockBackend::start().await;
    backend.on("GET", "/api/data/clients", MockResponse::json(json!([])));
    let api = backend.client(Arc::new(MemoryTokenStore::new()));

    api.list_clients().await.unwrap();
    assert!(backend.requests()[0].authorization.is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let backend = MockBackend::start().await;
    backend.on(
        "GET",
        "/api/orders",
        MockResponse::status(StatusCode::UNAUTHORIZED, json!({ "message": "jwt expired" })),
    );
    let tokens = MemoryTokenStore::with_token("stale");
    let api = backend.client(Arc::new(tokens.clone()));

    let err = api
        .list_orders(&fuelops_admin::api::OrderFilter::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(matches!(err, ApiError::Unauthorized { redirect: "/login" }));
    assert!(tokens.get_token().is_none());
}

#[tokio::test]
async fn test_login_stores_token() {
    let backend = MockBackend::start().await;
    backend.on(
        "POST",
        "/api/auth/login",
        MockResponse::json(json!({ "token": "fresh", "user": { "id": 1, "email": "a@depot.ma" } })),
    );
    let tokens = MemoryTokenStore::new();
    let api = backend.client(Arc::new(tokens.clone()));

    let response = api
        .login("a@depot.ma", &SecretString::from("secret"))
        .await
        .unwrap();
    assert_eq!(response.token, "fresh");
    assert_eq!(tokens.get_token().as_deref(), Some("fresh"));

    let body = backend.requests_to("POST", "/api/auth/login")[0].json();
    assert_eq!(body["email"], "a@depot.ma");
    assert_eq!(body["password"], "secret");
}

#[tokio::test]
async fn test_rejected_login_keeps_logged_out() {
    let backend = MockBackend::start().await;
    backend.on(
        "POST",
        "/api/auth/login",
        MockResponse::status(StatusCode::BAD_REQUEST, json!({ "message": "Invalid credentials" })),
    );
    let tokens = MemoryTokenStore::new();
    let api = backend.client(Arc::new(tokens.clone()));

    let err = api
        .login("a@depot.ma", &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid credentials"));
    assert!(tokens.get_token().is_none());
}
