use std::sync::Arc;

use super::transport::{ChatTransport, TransportError};

/// Outcome of relaying one message.
#[derive(Debug)]
pub enum ChatReply {
    /// The assistant answered.
    Delivered(String),
    /// The exchange failed; `text` is the configured fallback line.
    Fallback { text: String, cause: TransportError },
}

impl ChatReply {
    /// The bot line to append to the transcript.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Delivered(text) | Self::Fallback { text, .. } => text,
        }
    }

    #[must_use]
    pub const fn delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Sends messages through a [`ChatTransport`], substituting the fallback on failure.
#[derive(Clone)]
pub struct ChatRelay {
    transport: Arc<dyn ChatTransport>,
    fallback: String,
}

impl ChatRelay {
    pub fn new(transport: Arc<dyn ChatTransport>, fallback: impl Into<String>) -> Self {
        Self {
            transport,
            fallback: fallback.into(),
        }
    }

    /// Relay `message`. Never fails: transport errors become [`ChatReply::Fallback`].
    pub async fn send(&self, message: &str) -> ChatReply {
        match self.transport.exchange(message).await {
            Ok(reply) => ChatReply::Delivered(reply),
            Err(cause) => {
                tracing::warn!(error = %cause, "chat relay failed, using fallback reply");
                ChatReply::Fallback {
                    text: self.fallback.clone(),
                    cause,
                }
            }
        }
    }
}
