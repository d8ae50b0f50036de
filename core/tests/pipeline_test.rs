//! Integration tests for the authenticated request pipeline

mod common;

use std::sync::Arc;

use common::{authorization, ticket_body, token_body, user_body, Harness};
use reqwest::StatusCode;
use serde_json::json;
use servicedesk_core::api::tickets::Upload;
use servicedesk_core::{
    ApiRequest, AuthLost, AuthLostReason, DeskClient, DeskError, InMemorySessionStore,
    PendingRequest, SessionStore, TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"}))
}

// ---------------------------------------------------------------------------
// Credentials on outgoing requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_stored_token_is_sent_as_bearer() {
    let h = Harness::with_tokens("access-1", "refresh-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tickets/5"))
        .and(header("authorization", "Bearer access-1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body(5, "new")))
        .expect(1)
        .mount(&h.server)
        .await;

    let detail = h.client.tickets().get(5).await.unwrap();
    assert_eq!(detail.ticket.ticket_number, "TKT-00005");
    assert!(detail.comments.is_empty());
}

#[tokio::test]
async fn test_token_is_read_at_send_time() {
    let h = Harness::with_tokens("first", "refresh-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/notifications/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 3, "unread": 1})))
        .expect(2)
        .mount(&h.server)
        .await;

    h.client.notifications().count().await.unwrap();
    h.store.set(ACCESS_TOKEN_KEY, "second").unwrap();
    h.client.notifications().count().await.unwrap();

    let seen: Vec<_> = h
        .requests_to("/api/v1/notifications/count")
        .await
        .iter()
        .map(authorization)
        .collect();
    assert_eq!(
        seen,
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
    );
}

#[tokio::test]
async fn test_no_token_means_no_authorization_header() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a", "r")))
        .expect(1)
        .mount(&h.server)
        .await;

    let credentials = servicedesk_core::LoginRequest {
        email: "dispatcher@example.com".to_string(),
        password: "secret".to_string(),
    };
    h.client.auth().login(&credentials).await.unwrap();

    let requests = h.requests_to("/api/v1/auth/login").await;
    assert_eq!(authorization(&requests[0]), None);
    // login alone does not persist anything
    assert_eq!(h.tokens(), None);
}

#[tokio::test]
async fn test_tokens_survive_successful_traffic() {
    let h = Harness::with_tokens("A", "B").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/knowledge/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["hardware", "payments"])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    let categories = h.client.knowledge().categories().await.unwrap();
    assert_eq!(categories, vec!["hardware", "payments"]);
    assert!(h.client.roles().list().await.unwrap().is_empty());

    assert_eq!(h.tokens(), Some(TokenPair::new("A", "B")));
    assert!(h.requests_to("/api/v1/auth/refresh").await.is_empty());
}

// ---------------------------------------------------------------------------
// Refresh and retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_401_refreshes_and_retries_once() {
    let h = Harness::with_tokens("expired", "refresh-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "refresh-2")))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(false, &["tickets.view"])))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = h.client.auth().me().await.unwrap();
    assert_eq!(user.email, "dispatcher@example.com");

    assert_eq!(h.tokens(), Some(TokenPair::new("fresh", "refresh-2")));
    assert!(h.lost_events().is_empty());

    // The refresh call itself is unauthenticated
    let refreshes = h.requests_to("/api/v1/auth/refresh").await;
    assert_eq!(refreshes.len(), 1);
    assert_eq!(authorization(&refreshes[0]), None);
}

#[tokio::test]
async fn test_401_on_retry_passes_through() {
    let h = Harness::with_tokens("expired", "refresh-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tickets"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "refresh-2")))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .tickets()
        .list(&Default::default())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.detail(), "Could not validate credentials");

    // The refresh did succeed, so the new pair stays and nobody is logged out
    assert_eq!(h.tokens(), Some(TokenPair::new("fresh", "refresh-2")));
    assert!(h.lost_events().is_empty());

    let attempts: Vec<_> = h
        .requests_to("/api/v1/tickets")
        .await
        .iter()
        .map(authorization)
        .collect();
    assert_eq!(
        attempts,
        vec![Some("Bearer expired".to_string()), Some("Bearer fresh".to_string())]
    );
}

#[tokio::test]
async fn test_already_retried_request_is_not_refreshed() {
    let h = Harness::with_tokens("expired", "refresh-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/tickets"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "refresh-2")))
        .expect(0)
        .mount(&h.server)
        .await;

    let pending = PendingRequest {
        request: ApiRequest::get("/tickets"),
        retried: true,
    };
    let err = h.client.execute(pending).await.unwrap_err();
    assert!(err.is_unauthorized());

    assert_eq!(h.tokens(), Some(TokenPair::new("expired", "refresh-1")));
    assert!(h.lost_events().is_empty());
}

#[tokio::test]
async fn test_multipart_upload_is_replayed_after_refresh() {
    let h = Harness::with_tokens("expired", "refresh-1").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/tickets/9/attachments"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "refresh-2")))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets/9/attachments"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "filename": "photo.jpg",
            "file_path": "uploads/9/photo.jpg",
            "file_size": 4,
            "mime_type": "image/jpeg",
            "uploaded_by_id": 7,
            "uploaded_at": "2024-03-01T10:20:00"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let upload = Upload {
        file_name: "photo.jpg".to_string(),
        mime_type: Some("image/jpeg".to_string()),
        bytes: b"\xff\xd8\xff\xe0".to_vec(),
    };
    let attachment = h.client.tickets().upload_attachment(9, upload).await.unwrap();
    assert_eq!(attachment.filename, "photo.jpg");

    for request in h.requests_to("/api/v1/tickets/9/attachments").await {
        let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"), "{}", content_type);
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("filename=\"photo.jpg\""));
    }
}

// ---------------------------------------------------------------------------
// Lost sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_401_without_refresh_token_drops_access_token() {
    let store = InMemorySessionStore::new();
    store.set(ACCESS_TOKEN_KEY, "expired").unwrap();
    let h = Harness::with_store(store).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", "refresh-2")))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.auth().me().await.unwrap_err();
    assert!(err.is_unauthorized());

    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(h.store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    assert_eq!(
        h.lost_events(),
        vec![AuthLost {
            reason: AuthLostReason::NoRefreshToken,
            login_path: "/login".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_returns_refresh_error() {
    let h = Harness::with_tokens("expired", "revoked").await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/tickets/3"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid refresh token"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.tickets().delete(3).await.unwrap_err();
    match &err {
        DeskError::HttpError { status, detail } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(detail, "Invalid refresh token");
        }
        other => panic!("expected the refresh error, got {:?}", other),
    }

    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(h.store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    let events = h.lost_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, AuthLostReason::RefreshFailed);
}

#[tokio::test]
async fn test_login_path_is_reported_to_hook() {
    let h = Harness::with_tokens("expired", "revoked").await;
    let recorded = h.lost.clone();
    let client = h
        .client
        .clone()
        .with_login_path("/auth/sign-in")
        .with_auth_lost_hook(move |event| recorded.lock().unwrap().push(event.clone()));

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(unauthorized())
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let err = client.roles().list().await.unwrap_err();
    // The refresh endpoint answered 401 too; that is what the caller sees
    assert!(err.is_unauthorized());
    assert_eq!(err.detail(), "Unauthorized");
    assert_eq!(h.lost_events()[0].login_path, "/auth/sign-in");
}

// ---------------------------------------------------------------------------
// Errors that never trigger a refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_other_http_errors_pass_through() {
    let h = Harness::with_tokens("A", "B").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/4"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Not enough permissions"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("x", "y")))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.users().get(4).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.detail(), "Not enough permissions");
    assert_eq!(h.tokens(), Some(TokenPair::new("A", "B")));
    assert!(h.lost_events().is_empty());
}

#[tokio::test]
async fn test_transport_errors_pass_through() {
    let store = Arc::new(InMemorySessionStore::with_tokens(&TokenPair::new("A", "B")));
    // Nothing listens on port 1
    let client = DeskClient::new("http://127.0.0.1:1/api/v1", store.clone());

    let err = client.roles().list().await.unwrap_err();
    assert!(matches!(err, DeskError::TransportError(_)), "{:?}", err);
    assert_eq!(store.tokens().unwrap(), Some(TokenPair::new("A", "B")));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_401s_refresh_independently() {
    let h = Harness::with_tokens("expired", "refresh-1").await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&h.server)
        .await;
    // Each refresh hands out a different pair
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-a", "refresh-a")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh-b", "refresh-b")))
        .expect(1)
        .mount(&h.server)
        .await;
    for token in ["fresh-a", "fresh-b"] {
        Mock::given(method("GET"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(ticket_body(1, "open")))
            .mount(&h.server)
            .await;
    }

    let (first, second) = tokio::join!(
        h.client.send(ApiRequest::get("/tickets/1")),
        h.client.send(ApiRequest::get("/tickets/2")),
    );
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);

    let issued = [
        TokenPair::new("fresh-a", "refresh-a"),
        TokenPair::new("fresh-b", "refresh-b"),
    ];
    let stored = h.tokens().expect("a refreshed pair is stored");
    assert!(issued.contains(&stored), "stored pair mixes two refreshes: {:?}", stored);
    assert!(h.lost_events().is_empty());
}
