//! HTTP mock server helpers for testing outbound HTTP calls.
//!
//! A thin builder over `wiremock` for stubbing the assistant endpoint.
//!
//! ```ignore
//! let server = MockHttpServer::start().await;
//! server
//!     .expect_post("/chat")
//!     .respond_with_json(json!({"reply": "hi"}))
//!     .mount()
//!     .await;
//! let transport = HttpChatTransport::new(server.url("/chat"));
//! ```

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct MockHttpServer {
    inner: MockServer,
}

impl MockHttpServer {
    pub async fn start() -> Self {
        Self {
            inner: MockServer::start().await,
        }
    }

    /// Absolute URL for `route` on this server.
    pub fn url(&self, route: &str) -> String {
        format!("{}{route}", self.inner.uri())
    }

    pub fn expect_post(&self, route: &str) -> StubBuilder<'_> {
        StubBuilder {
            server: &self.inner,
            method: "POST",
            path: route.to_string(),
            body_json: None,
            response: ResponseTemplate::new(200),
            times: None,
        }
    }

    /// Requests received so far, as parsed JSON bodies.
    pub async fn received_json(&self) -> Vec<Value> {
        self.inner
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}

pub struct StubBuilder<'a> {
    server: &'a MockServer,
    method: &'static str,
    path: String,
    body_json: Option<Value>,
    response: ResponseTemplate,
    times: Option<u64>,
}

impl StubBuilder<'_> {
    /// Only match requests with exactly this JSON body.
    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body_json = Some(body);
        self
    }

    pub fn respond_with_json(mut self, body: Value) -> Self {
        self.response = ResponseTemplate::new(200).set_body_json(body);
        self
    }

    pub fn respond_with_status(mut self, status: u16) -> Self {
        self.response = ResponseTemplate::new(status);
        self
    }

    pub fn respond_with_body(mut self, status: u16, body: &str) -> Self {
        self.response = ResponseTemplate::new(status).set_body_string(body);
        self
    }

    pub fn respond_with_delay(mut self, delay: Duration) -> Self {
        self.response = self.response.set_delay(delay);
        self
    }

    /// Fail the test on drop unless the stub matched exactly `n` times.
    pub fn expect_times(mut self, n: u64) -> Self {
        self.times = Some(n);
        self
    }

    pub async fn mount(self) {
        let mut mock = Mock::given(method(self.method)).and(path(self.path.as_str()));
        if let Some(body) = self.body_json {
            mock = mock.and(wiremock::matchers::body_json(body));
        }
        let mut mock = mock.respond_with(self.response);
        if let Some(n) = self.times {
            mock = mock.expect(n);
        }
        mock.mount(self.server).await;
    }
}
