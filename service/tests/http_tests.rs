//! HTTP integration tests using TestAppBuilder.
//!
//! These tests verify the HTTP layer shared by every route: health check,
//! CORS, security headers, and the optional Swagger UI.

mod common;

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_SECURITY_POLICY,
            ORIGIN, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
        },
        HeaderValue, Method, Request, StatusCode,
    },
};
use common::app_builder::TestAppBuilder;
use resource_connect_api::config::SecurityHeadersConfig;
use tower::ServiceExt;

fn preflight(origin: &str, method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header(ORIGIN, origin)
        .header("Access-Control-Request-Method", method)
        .body(Body::empty())
        .expect("request")
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestAppBuilder::minimal().build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint_with_full_app() {
    let app = TestAppBuilder::with_mocks().build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// CORS Tests
// =============================================================================

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = TestAppBuilder::minimal()
        .with_cors(&["http://localhost:3000"])
        .build();

    let response = app
        .oneshot(preflight("http://localhost:3000", "GET", "/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("http://localhost:3000"))
    );
}

#[tokio::test]
async fn test_cors_blocks_unconfigured_origin() {
    let app = TestAppBuilder::minimal()
        .with_cors(&["http://localhost:3000"])
        .build();

    let response = app
        .oneshot(preflight("http://evil.com", "GET", "/health"))
        .await
        .expect("response");

    assert!(response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_empty_list_blocks_everything() {
    let app = TestAppBuilder::minimal().with_cors(&[]).build();

    let response = app
        .oneshot(preflight("http://localhost:3000", "GET", "/health"))
        .await
        .expect("response");

    assert!(response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_wildcard_allows_any_origin() {
    let app = TestAppBuilder::minimal().with_cors(&["*"]).build();

    let response = app
        .oneshot(preflight("http://any-origin.com", "GET", "/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("*"))
    );
}

#[tokio::test]
async fn test_cors_allows_session_methods() {
    let app = TestAppBuilder::with_mocks().build();

    let response = app
        .oneshot(preflight(
            "http://localhost:3000",
            "PUT",
            "/api/v1/sessions/00000000-0000-0000-0000-000000000000/map/selection",
        ))
        .await
        .expect("response");

    let methods = response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_METHODS)
        .expect("should have allow-methods header")
        .to_str()
        .expect("valid string")
        .to_uppercase();

    for method in ["GET", "POST", "PUT", "DELETE"] {
        assert!(methods.contains(method), "should allow {method}: {methods}");
    }
}

// =============================================================================
// Security Headers Tests
// =============================================================================

#[tokio::test]
async fn test_security_headers_default_config() {
    let app = TestAppBuilder::minimal()
        .with_security_headers_default()
        .build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response.headers().get(X_CONTENT_TYPE_OPTIONS),
        Some(&HeaderValue::from_static("nosniff"))
    );
    assert_eq!(
        response.headers().get(X_FRAME_OPTIONS),
        Some(&HeaderValue::from_static("DENY"))
    );
    assert_eq!(
        response.headers().get(X_XSS_PROTECTION),
        Some(&HeaderValue::from_static("1; mode=block"))
    );
    assert_eq!(
        response.headers().get(CONTENT_SECURITY_POLICY),
        Some(&HeaderValue::from_static("default-src 'self'"))
    );
}

#[tokio::test]
async fn test_security_headers_custom_frame_options() {
    let config = SecurityHeadersConfig {
        frame_options: "SAMEORIGIN".to_string(),
        ..SecurityHeadersConfig::default()
    };

    let app = TestAppBuilder::minimal()
        .with_security_headers(config)
        .build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response.headers().get(X_FRAME_OPTIONS),
        Some(&HeaderValue::from_static("SAMEORIGIN"))
    );
}

#[tokio::test]
async fn test_security_headers_disabled() {
    let config = SecurityHeadersConfig {
        enabled: false,
        ..SecurityHeadersConfig::default()
    };

    let app = TestAppBuilder::minimal()
        .with_security_headers(config)
        .build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert!(response.headers().get(X_FRAME_OPTIONS).is_none());
    assert!(response.headers().get(X_CONTENT_TYPE_OPTIONS).is_none());
}

#[tokio::test]
async fn test_security_headers_on_error_responses() {
    let app = TestAppBuilder::with_mocks().build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/sessions/00000000-0000-0000-0000-000000000000/search")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(X_CONTENT_TYPE_OPTIONS),
        Some(&HeaderValue::from_static("nosniff"))
    );
}

// =============================================================================
// Swagger UI
// =============================================================================

#[tokio::test]
async fn test_openapi_document_served_with_swagger() {
    let app = TestAppBuilder::with_mocks().build();

    let (status, doc) = common::send(&app, Method::GET, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Resource Connect API");
    assert!(doc["paths"]["/sessions/{id}/chat"].is_object());
}

#[tokio::test]
async fn test_openapi_document_absent_without_swagger() {
    let app = TestAppBuilder::new().with_rest().with_health().build();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
