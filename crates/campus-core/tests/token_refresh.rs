//! Integration tests for bearer-token attachment and the refresh-and-retry cycle.

use std::sync::Arc;

use campus_core::{
    ApiClient, ApiError, ApiRequest, MemoryTokenStore, RecordingNavigator, TokenKind, TokenStore,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

struct Harness {
    client: ApiClient,
    tokens: Arc<MemoryTokenStore>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(base_url: &str, access: Option<&str>, refresh: Option<&str>) -> Harness {
    let tokens = Arc::new(MemoryTokenStore::with_tokens(access, refresh));
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(base_url, tokens.clone(), navigator.clone()).expect("client");
    Harness {
        client,
        tokens,
        navigator,
    }
}

fn api_error(err: &anyhow::Error) -> &ApiError {
    err.downcast_ref::<ApiError>()
        .unwrap_or_else(|| panic!("expected ApiError, got: {:#}", err))
}

#[tokio::test]
async fn test_stored_token_is_sent_as_bearer() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("abc"), None);
    let body: Value = h.client.get("/profile").await.expect("request succeeds");
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn test_missing_or_sentinel_token_sends_no_header() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(4)
        .mount(&server)
        .await;

    for stored in [None, Some("undefined"), Some("null"), Some("")] {
        let h = harness(&server.uri(), stored, None);
        let courses = h.client.courses().await.expect("request succeeds");
        assert!(courses.is_empty());
    }

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 4);
    for request in requests {
        assert!(
            request.headers.get("authorization").is_none(),
            "unexpected Authorization header: {:?}",
            request.headers.get("authorization")
        );
    }
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries_with_new_token() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Ayşe"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("old"), Some("r1"));
    let body: Value = h.client.get("/profile").await.expect("retried request succeeds");

    assert_eq!(body["name"], "Ayşe");
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap().as_deref(), Some("new"));
    assert_eq!(h.tokens.get(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
    assert!(h.navigator.history().is_empty());
}

#[tokio::test]
async fn test_rotated_refresh_token_is_persisted() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallet/balance"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"accessToken": "new", "refreshToken": "r2"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wallet/balance"))
        .and(header("authorization", "Bearer new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"balance": 50}})),
        )
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("old"), Some("r1"));
    let wallet = h.client.wallet().await.expect("wallet after refresh");

    assert_eq!(wallet.balance, 50.0);
    assert_eq!(h.tokens.get(TokenKind::Refresh).unwrap().as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_refresh_failure_clears_tokens_and_redirects_to_login() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500).set_body_string("refresh store down"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("abc"), Some("r1"));
    let err = h.client.get::<Value>("/profile").await.expect_err("refresh fails");

    assert!(matches!(api_error(&err), ApiError::ServerError(body) if body == "refresh store down"));
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap(), None);
    assert_eq!(h.tokens.get(TokenKind::Refresh).unwrap(), None);
    assert_eq!(h.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_401_without_refresh_token_ends_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/grades/my-grades"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("abc"), None);
    let err = h.client.my_grades().await.expect_err("no refresh token");

    assert!(matches!(api_error(&err), ApiError::MissingRefreshToken));
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap(), None);
    assert_eq!(h.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_refresh_without_usable_access_token_ends_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    for refreshed in ["", "null"] {
        let server = MockServer::start().await;
        // Only the original attempt reaches the server; there is no retry
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({"refreshToken": "r1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": refreshed})))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server.uri(), Some("abc"), Some("r1"));
        let err = h.client.get::<Value>("/profile").await.expect_err("unusable refresh");

        assert!(
            matches!(api_error(&err), ApiError::InvalidResponse(_)),
            "accessToken {:?}: {:#}",
            refreshed,
            err
        );
        assert_eq!(h.tokens.get(TokenKind::Access).unwrap(), None);
        assert_eq!(h.tokens.get(TokenKind::Refresh).unwrap(), None);
        assert_eq!(h.navigator.last().as_deref(), Some("/login"));
    }
}

#[tokio::test]
async fn test_sentinel_refresh_token_is_never_sent() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("abc"), Some("undefined"));
    let err = h.client.get::<Value>("/profile").await.expect_err("sentinel refresh token");

    assert!(matches!(api_error(&err), ApiError::MissingRefreshToken));
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap(), None);
    assert_eq!(h.tokens.get(TokenKind::Refresh).unwrap(), None);
    assert_eq!(h.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_second_401_after_retry_is_surfaced() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("old"), Some("r1"));
    let err = h.client.get::<Value>("/profile").await.expect_err("still unauthorized");

    assert!(matches!(api_error(&err), ApiError::Unauthorized));
    // The refresh itself succeeded, so the session stays
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap().as_deref(), Some("new"));
    assert!(h.navigator.history().is_empty());
}

#[tokio::test]
async fn test_request_already_retried_is_not_refreshed() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("abc"), Some("r1"));
    let mut request = ApiRequest::get("/events");
    request.mark_retried();

    let response = h.client.authenticated().execute(request).await.expect("response");
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_other_errors_pass_through_without_refresh() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses/9"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Staff only"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("abc"), Some("r1"));

    let err = h.client.course(9).await.expect_err("forbidden");
    assert!(matches!(api_error(&err), ApiError::AccessDenied(msg) if msg == "Staff only"));

    let err = h.client.events().await.expect_err("rate limited");
    assert!(matches!(api_error(&err), ApiError::RateLimited));

    assert_eq!(h.tokens.get(TokenKind::Access).unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_network_error_propagates_untouched() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    // Grab a free port, then close it so nothing is listening
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let h = harness(&format!("http://{}", addr), Some("abc"), Some("r1"));
    let err = h.client.profile().await.expect_err("connection refused");

    assert!(matches!(api_error(&err), ApiError::NetworkError(_)));
    assert_eq!(h.tokens.get(TokenKind::Access).unwrap().as_deref(), Some("abc"));
    assert_eq!(h.tokens.get(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
    assert!(h.navigator.history().is_empty());
}

#[tokio::test]
async fn test_concurrent_401s_both_recover() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = harness(&server.uri(), Some("old"), Some("r1"));
    let (events, courses) = tokio::join!(h.client.events(), h.client.courses());

    assert!(events.expect("events").is_empty());
    assert!(courses.expect("courses").is_empty());

    let refreshes = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.url.path() == "/auth/refresh")
        .count();
    assert!((1..=2).contains(&refreshes), "refresh count: {}", refreshes);
}
