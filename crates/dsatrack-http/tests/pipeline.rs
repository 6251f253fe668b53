//! Authenticated pipeline tests.
//!
//! These tests use wiremock to simulate the tracker API and check the
//! decorate / refresh / retry-once behavior without network access.

use std::sync::Arc;

use dsatrack_core::error::{Error, TransportError};
use dsatrack_core::{AccessToken, ApiUrl, CredentialStore, MemoryStore, RefreshToken};
use dsatrack_http::{AuthRequest, RefreshFailurePolicy, Session, SessionConfig, StatusCode};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const REFRESH_PATH: &str = "/api/users/auth/token/refresh/";

/// Helper to create an API URL from a mock server.
fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn session_with(
    server: &MockServer,
    access: Option<&str>,
    refresh: Option<&str>,
    policy: RefreshFailurePolicy,
) -> (Session, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_tokens(access, refresh));
    let config = SessionConfig {
        failure_policy: policy,
        ..SessionConfig::default()
    };
    let session = Session::with_config(mock_api_url(server), store.clone(), config).unwrap();
    (session, store)
}

fn session(server: &MockServer, access: Option<&str>, refresh: Option<&str>) -> (Session, Arc<MemoryStore>) {
    session_with(server, access, refresh, RefreshFailurePolicy::KeepCredentials)
}

async fn requests_to(server: &MockServer, target: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == target)
        .count()
}

/// Serve one scripted response per accepted connection, in order. `None`
/// drops the connection after reading the request, without answering.
async fn scripted_server(responses: Vec<Option<String>>) -> ApiUrl {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        for response in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            if let Some(response) = response {
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        }
    });

    ApiUrl::new(format!("http://127.0.0.1:{}", port)).unwrap()
}

async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

// ============================================================================
// Pass-through
// ============================================================================

#[tokio::test]
async fn test_success_passes_through_with_one_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (session, store) = session(&server, Some("A1"), Some("R1"));
    let response = session.fetch("/api/x").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true}));

    assert_eq!(store.access(), Some(AccessToken::new("A1")));
    assert_eq!(store.refresh(), Some(RefreshToken::new("R1")));
}

#[tokio::test]
async fn test_non_401_errors_pass_through_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = session(&server, Some("A1"), Some("R1"));

    let response = session.fetch("/api/missing").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Not found.");

    let response = session.fetch("/api/broken").await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.unwrap(), "boom");

    assert_eq!(requests_to(&server, REFRESH_PATH).await, 0);
}

#[tokio::test]
async fn test_path_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let (session, _) = session(&server, Some("A1"), None);
    assert_eq!(session.fetch("api/x").await.unwrap().status(), 204);
    assert_eq!(session.fetch("///api/x").await.unwrap().status(), 204);
}

#[tokio::test]
async fn test_caller_headers_kept_but_authorization_replaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .and(header("authorization", "Bearer A1"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = session(&server, Some("A1"), None);
    let request = AuthRequest::get("/api/x")
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer caller"))
        .try_header("x-trace", "abc")
        .unwrap();

    assert_eq!(session.auth_fetch(request).await.unwrap().status(), 200);
}

#[tokio::test]
async fn test_missing_access_token_sends_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/public"))
        .and(|req: &Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = session(&server, None, None);
    let request = AuthRequest::get("/api/public")
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));

    assert_eq!(session.auth_fetch(request).await.unwrap().status(), 200);
}

// ============================================================================
// Refresh and retry
// ============================================================================

#[tokio::test]
async fn test_expired_access_is_refreshed_and_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session(&server, Some("A1"), Some("R1"));
    let response = session.fetch("/api/x").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["value"], 42);

    assert_eq!(store.access(), Some(AccessToken::new("A2")));
    assert_eq!(store.refresh(), Some(RefreshToken::new("R1")));
    assert_eq!(requests_to(&server, "/api/x").await, 2);
}

#[tokio::test]
async fn test_second_401_is_returned_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session(&server, Some("A1"), Some("R1"));
    let response = session.fetch("/api/x").await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.access(), Some(AccessToken::new("A2")));
}

#[tokio::test]
async fn test_retry_replays_method_and_body() {
    let server = MockServer::start().await;
    let payload = json!({"first_name": "Ada"});

    Mock::given(method("PATCH"))
        .and(path("/api/users/me/update/"))
        .and(header("authorization", "Bearer A1"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/users/me/update/"))
        .and(header("authorization", "Bearer A2"))
        .and(header("content-type", "application/json"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (session, _) = session(&server, Some("A1"), Some("R1"));
    let request = AuthRequest::patch("/api/users/me/update/")
        .json(&payload)
        .unwrap();

    assert_eq!(session.auth_fetch(request).await.unwrap().status(), 200);
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "A2", "refresh": "R2"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (session, store) = session(&server, Some("A1"), Some("R1"));
    session.fetch("/api/x").await.unwrap();

    assert_eq!(store.access(), Some(AccessToken::new("A2")));
    assert_eq!(store.refresh(), Some(RefreshToken::new("R2")));
}

// ============================================================================
// Unrecoverable failures
// ============================================================================

#[tokio::test]
async fn test_missing_refresh_token_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(0)
        .mount(&server)
        .await;

    let (session, store) = session(&server, Some("A1"), None);
    let err = session.fetch("/api/x").await.unwrap_err();

    assert!(err.is_authentication_expired(), "unexpected error: {err}");
    assert_eq!(store.access(), Some(AccessToken::new("A1")));
}

#[tokio::test]
async fn test_rejected_refresh_keeps_credentials_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({"refresh": "R_stale"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired",
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session(&server, Some("A1"), Some("R_stale"));
    let err = session.fetch("/api/x").await.unwrap_err();

    assert!(err.is_authentication_expired(), "unexpected error: {err}");
    assert_eq!(store.access(), Some(AccessToken::new("A1")));
    assert_eq!(store.refresh(), Some(RefreshToken::new("R_stale")));
}

#[tokio::test]
async fn test_rejected_refresh_clears_credentials_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session_with(
        &server,
        Some("A1"),
        Some("R_stale"),
        RefreshFailurePolicy::ClearCredentials,
    );
    let err = session.fetch("/api/x").await.unwrap_err();

    assert!(err.is_authentication_expired());
    assert!(store.access().is_none());
    assert!(store.refresh().is_none());
    assert_eq!(session.state(), dsatrack_core::SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind and release a port so nothing is listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api = ApiUrl::new(format!(
        "http://127.0.0.1:{}",
        listener.local_addr().unwrap().port()
    ))
    .unwrap();
    drop(listener);

    let store = Arc::new(MemoryStore::with_tokens(Some("A1"), Some("R1")));
    let session = Session::new(api, store.clone()).unwrap();
    let err = session.fetch("/api/x").await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "unexpected error: {err}");
    assert_eq!(store.access(), Some(AccessToken::new("A1")));
}

#[tokio::test]
async fn test_explicit_refresh_without_refresh_token() {
    let server = MockServer::start().await;
    let (session, _) = session(&server, Some("A1"), None);

    let err = session.refresh().await.unwrap_err();
    assert!(err.is_authentication_expired());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_undecodable_refresh_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/x"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let (session, store) = session_with(
        &server,
        Some("A1"),
        Some("R1"),
        RefreshFailurePolicy::ClearCredentials,
    );
    let err = session.fetch("/api/x").await.unwrap_err();

    assert!(
        matches!(err, Error::Transport(TransportError::Decode { .. })),
        "unexpected error: {err}"
    );
    // Only a rejected refresh token clears credentials.
    assert_eq!(store.access(), Some(AccessToken::new("A1")));
    assert_eq!(store.refresh(), Some(RefreshToken::new("R1")));
    assert_eq!(session.state(), dsatrack_core::SessionState::Authenticated);
}

#[tokio::test]
async fn test_retry_transport_failure_is_propagated() {
    let api = scripted_server(vec![
        Some(http_response("401 Unauthorized", "")),
        Some(http_response("200 OK", r#"{"access": "A2"}"#)),
        None,
    ])
    .await;

    let store = Arc::new(MemoryStore::with_tokens(Some("A1"), Some("R1")));
    let session = Session::new(api, store.clone()).unwrap();
    let err = session.fetch("/api/x").await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "unexpected error: {err}");
    assert_eq!(store.access(), Some(AccessToken::new("A2")));
}
