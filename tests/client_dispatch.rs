//! Dispatch behavior against a live mock backend: URL resolution,
//! header assembly, failure classification and retry policy.

mod common;

use std::time::{Duration, Instant};

use common::mock_backend::{MockBackend, MockResponse};
use reqwest::Method;
use serde_json::json;
use souq_client::{
    ApiClient, ApiError, AuthScheme, ClientOptions, ProfileStorage, ProfileStore, RequestOptions,
    Resource, TokenStore,
};

#[tokio::test]
async fn test_success_returns_parsed_body() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(r#"{"stores": [1, 2]}"#))
        .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |_| {});
    let value = client
        .request(Method::GET, "/stores", None, RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(value, json!({"stores": [1, 2]}));
    let captured = mock.captured_requests().await;
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].method, "GET");
    assert_eq!(captured[0].path, "/stores");
    assert_eq!(captured[0].header("x-souq-platform"), Some("cli"));
}

#[tokio::test]
async fn test_endpoint_override_rewrites_path() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(r#"{"id": "42"}"#))
        .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft
            .endpoints
            .insert(Resource::Stores, "/shops".to_string());
    });
    client
        .request(Method::GET, "/stores/42", None, RequestOptions::default())
        .await
        .unwrap();

    let captured = mock.captured_requests().await;
    assert_eq!(captured[0].path, "/shops/42");
}

#[tokio::test]
async fn test_query_string_reaches_backend() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default()).await;

    let (_dir, client) = common::client_for(&mock.base_url(), |_| {});
    client
        .request(
            Method::GET,
            "/products?category=food&page=2",
            None,
            RequestOptions::default(),
        )
        .await
        .unwrap();

    let captured = mock.captured_requests().await;
    assert_eq!(captured[0].path, "/products?category=food&page=2");
}

#[tokio::test]
async fn test_http_failure_carries_status_and_body_message() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(404, "store not found"))
        .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |_| {});
    let err = client
        .request(Method::GET, "/stores/9", None, RequestOptions::default())
        .await
        .unwrap_err();

    match &err {
        ApiError::Http { status, body, .. } => {
            assert_eq!(*status, 404);
            assert_eq!(body["error"], "store not found");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "store not found");
}

#[tokio::test]
async fn test_http_failure_is_not_retried() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::error(500, "boom")).await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft.retries = Some(3);
    });
    let err = client
        .request(Method::GET, "/stores", None, RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 500, .. }));
    // A status failure must consume exactly one attempt.
    assert_eq!(mock.captured_requests().await.len(), 1);
}

#[tokio::test]
async fn test_timeout_is_its_own_failure_kind() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default().with_delay(500))
        .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft.timeout = Some(50);
    });

    let started = Instant::now();
    let err = client
        .request(Method::GET, "/stores", None, RequestOptions::default())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ApiError::Timeout { duration_ms: 50 }));
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(400), "took {elapsed:?}");
}

#[tokio::test]
async fn test_network_failure_external_copy() {
    let unreachable = format!("http://127.0.0.1:{}", common::free_port());
    let (_dir, client) = common::client_for(&unreachable, |_| {});

    let err = client
        .request(Method::GET, "/stores", None, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.error_type(), "network_error");
    assert!(err.to_string().contains("configured server"), "{err}");
}

#[tokio::test]
async fn test_network_failure_local_copy() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = ProfileStore::open(ProfileStorage::new(dir.path()));
    let options = ClientOptions {
        external_enabled: false,
        local_base_url: format!("http://127.0.0.1:{}", common::free_port()),
        ..ClientOptions::default()
    };
    let client = ApiClient::new(store, TokenStore::new(), options);

    let err = client
        .request(Method::GET, "/stores", None, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.error_type(), "network_error");
    assert!(err.to_string().contains("local API server"), "{err}");
}

#[tokio::test]
async fn test_bearer_auth_header() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default()).await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft.authentication = AuthScheme::Bearer;
    });
    client.tokens().set("session-token");

    client
        .request(Method::GET, "/orders", None, RequestOptions::authenticated())
        .await
        .unwrap();

    let captured = mock.captured_requests().await;
    assert_eq!(
        captured[0].header("authorization"),
        Some("Bearer session-token")
    );
}

#[tokio::test]
async fn test_apikey_and_static_headers() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default()).await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft.authentication = AuthScheme::ApiKey {
            header: "x-api-key".to_string(),
            value: "k-123".to_string(),
        };
        draft
            .headers
            .insert("x-tenant".to_string(), "alpha".to_string());
    });

    client
        .request(Method::GET, "/orders", None, RequestOptions::authenticated())
        .await
        .unwrap();

    let captured = mock.captured_requests().await;
    assert_eq!(captured[0].header("x-api-key"), Some("k-123"));
    assert_eq!(captured[0].header("x-tenant"), Some("alpha"));
}

#[tokio::test]
async fn test_caller_headers_override_profile_headers() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::default()).await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft
            .headers
            .insert("x-tenant".to_string(), "alpha".to_string());
    });

    let opts = RequestOptions {
        auth: false,
        headers: vec![("x-tenant".to_string(), "beta".to_string())],
    };
    client
        .request(Method::GET, "/stores", None, opts)
        .await
        .unwrap();

    let captured = mock.captured_requests().await;
    assert_eq!(captured[0].header("x-tenant"), Some("beta"));
}

#[tokio::test]
async fn test_login_stores_token_and_logout_clears_it() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse::json(
        r#"{"token": "jwt-1", "user": {"id": "u1"}}"#,
    ))
    .await;
    mock.enqueue_response(MockResponse::json(r#"{"ok": true}"#))
        .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |draft| {
        draft.authentication = AuthScheme::Bearer;
    });

    client.login("a@example.com", "secret").await.unwrap();
    assert_eq!(client.tokens().get().unwrap().expose(), "jwt-1");

    client.logout().await.unwrap();
    assert!(client.tokens().get().is_none());

    let captured = mock.captured_requests().await;
    assert_eq!(captured[0].path, "/auth/login");
    assert_eq!(
        captured[0].header("content-type"),
        Some("application/json")
    );
    // Logout rode the stored token.
    assert_eq!(captured[1].header("authorization"), Some("Bearer jwt-1"));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse {
        status: 204,
        headers: vec![],
        body: Vec::new(),
        delay_ms: 0,
    })
    .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |_| {});
    let value = client
        .request(Method::DELETE, "/stores/1", None, RequestOptions::default())
        .await
        .unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_non_json_error_body_degrades_to_empty_object() {
    let mock = MockBackend::start().await;
    mock.enqueue_response(MockResponse {
        status: 502,
        headers: vec![("content-type".to_string(), "text/html".to_string())],
        body: b"<html>Bad Gateway</html>".to_vec(),
        delay_ms: 0,
    })
    .await;

    let (_dir, client) = common::client_for(&mock.base_url(), |_| {});
    let err = client
        .request(Method::GET, "/stores", None, RequestOptions::default())
        .await
        .unwrap_err();

    match err {
        ApiError::Http { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body, json!({}));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}
