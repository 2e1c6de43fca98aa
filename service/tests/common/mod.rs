//! Common test utilities for integration tests.
//!
//! - [`app_builder::TestAppBuilder`] - Build test Axum apps that mirror main.rs wiring
//! - [`http_mock::MockHttpServer`] - Stub the assistant endpoint with `wiremock`
//! - [`send`] / [`send_json`] - One-shot requests with the body parsed as JSON

#![allow(dead_code)]

pub mod app_builder;
pub mod http_mock;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

/// Send a request with no body and parse the response as JSON (`Null` if empty).
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    dispatch(app, request).await
}

/// Send a JSON body and parse the response as JSON (`Null` if empty).
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: &Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response should be JSON")
    };
    (status, json)
}

/// Create a session and return its REST base path.
pub async fn open_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/v1/sessions").await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["sessionId"].as_str().expect("session id");
    format!("/api/v1/sessions/{id}")
}
