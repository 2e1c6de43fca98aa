//! Transport to the external assistant endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChatConfig;

/// Failures talking to the assistant endpoint.
///
/// These never reach the visitor as errors: [`super::ChatRelay`] turns them
/// into the fallback reply.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network unreachable, timeout, or an unreadable response body
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("chat endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

/// One request/response exchange with the assistant.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `message` and return the assistant's reply text.
    async fn exchange(&self, message: &str) -> Result<String, TransportError>;
}

/// Posts `{"message": ...}` to a fixed URL and reads `{"reply": ...}`.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    /// Create a transport with no request timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a transport with a custom `reqwest::Client` (for testing with custom config).
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Build from configuration, applying `timeout_secs` when set.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn from_config(config: &ChatConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("resource-connect/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, config.endpoint.clone()))
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn exchange(&self, message: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed.reply)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Scripted transport for unit and router tests.

    use super::{ChatTransport, TransportError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays queued outcomes in order, then echoes `reply: <message>`.
    ///
    /// An optional delay holds each exchange open so tests can observe the
    /// busy state of a session.
    pub struct MockChatTransport {
        outcomes: Mutex<VecDeque<Result<String, TransportError>>>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl MockChatTransport {
        pub fn new() -> Self {
            Self {
                outcomes: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        /// Every exchange fails with a 503.
        pub fn failing() -> Self {
            let mock = Self::new();
            for _ in 0..64 {
                mock.push_failure(503);
            }
            mock
        }

        #[must_use]
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn push_reply(&self, reply: &str) {
            self.outcomes
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
        }

        pub fn push_failure(&self, status: u16) {
            self.outcomes
                .lock()
                .unwrap()
                .push_back(Err(TransportError::Status {
                    status,
                    body: "unavailable".to_string(),
                }));
        }

        /// Messages received so far.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Default for MockChatTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ChatTransport for MockChatTransport {
        async fn exchange(&self, message: &str) -> Result<String, TransportError> {
            self.calls.lock().unwrap().push(message.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("reply: {message}")))
        }
    }
}
