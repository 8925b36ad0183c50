/// Integration tests for the Barq API surface
///
/// These drive the fully-layered router end-to-end:
/// - health check degradation when the database is unreachable
/// - JWT gatekeeping on protected routes (missing, malformed, expired,
///   wrong-type tokens)
/// - request validation responses
/// - per-client rate limiting with Retry-After
/// - security headers on every response
///
/// Each test pins its own `X-Forwarded-For` so the process-wide rate
/// limiter cannot couple tests together.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use barq_shared::models::user::UserRole;
use common::TestContext;
use serde_json::json;
use tower::Service as _;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The health endpoint answers even when the database is down
#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-forwarded-for", "10.1.0.1")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
    assert!(body["version"].is_string());
}

/// Protected routes refuse requests without a token
#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new();

    for uri in ["/v1/tasks", "/v1/projects", "/v1/notifications/unread/count"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-forwarded-for", "10.1.0.2")
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }
}

/// A non-Bearer authorization header is a bad request, not a 401
#[tokio::test]
async fn test_malformed_authorization_header() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .header("x-forwarded-for", "10.1.0.3")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Garbage and expired tokens are both rejected with 401
#[tokio::test]
async fn test_invalid_and_expired_tokens_rejected() {
    let ctx = TestContext::new();

    for header in [
        "Bearer not.a.token".to_string(),
        ctx.expired_header(UserRole::Manager),
    ] {
        let request = Request::builder()
            .method("GET")
            .uri("/v1/tasks")
            .header("authorization", &header)
            .header("x-forwarded-for", "10.1.0.4")
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

/// Refresh tokens cannot be used as access tokens
#[tokio::test]
async fn test_refresh_token_rejected_on_api_calls() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .header("authorization", ctx.refresh_header(UserRole::Employee))
        .header("x-forwarded-for", "10.1.0.5")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Registration input failures come back as structured 422s
#[tokio::test]
async fn test_registration_validation_errors() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "10.1.0.6")
        .body(Body::from(
            json!({
                "username": "ab",
                "email": "not-an-email",
                "password": "short",
                "full_name": ""
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

/// Auth endpoints lock a client out after ten requests in a minute
#[tokio::test]
async fn test_auth_endpoints_rate_limited() {
    let ctx = TestContext::new();

    let make_request = || {
        Request::builder()
            .method("POST")
            .uri("/v1/auth/refresh")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "10.1.0.7")
            .body(Body::from(
                json!({ "refresh_token": "junk" }).to_string(),
            ))
            .unwrap()
    };

    for _ in 0..10 {
        let response = ctx.app.clone().call(make_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = ctx.app.clone().call(make_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));

    let body = body_json(response).await;
    assert_eq!(body["error"], "rate_limit_exceeded");
}

/// Rate limiting is per client; a neighbor's lockout does not spill over
#[tokio::test]
async fn test_rate_limit_scoped_per_client() {
    let ctx = TestContext::new();

    for _ in 0..10 {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/auth/refresh")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "10.1.0.8")
            .body(Body::from(json!({ "refresh_token": "junk" }).to_string()))
            .unwrap();
        ctx.app.clone().call(request).await.unwrap();
    }

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/refresh")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "10.1.0.9")
        .body(Body::from(json!({ "refresh_token": "junk" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Security headers ride on every response
#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-forwarded-for", "10.1.0.10")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.get("Content-Security-Policy").is_some());
    // Not production: no HSTS
    assert!(headers.get("Strict-Transport-Security").is_none());
}

/// A valid token clears the middleware; a malformed path id still 400s
#[tokio::test]
async fn test_path_id_must_be_uuid() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/users/not-a-uuid")
        .header("authorization", ctx.auth_header(UserRole::Manager))
        .header("x-forwarded-for", "10.1.0.12")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Unknown paths fall through to a 404 without touching auth
#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/does-not-exist")
        .header("x-forwarded-for", "10.1.0.11")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
