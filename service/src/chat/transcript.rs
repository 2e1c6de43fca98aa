use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::relay::ChatReply;
use super::GREETING;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    fn user(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sender: Sender::User,
        }
    }

    fn bot(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sender: Sender::Bot,
        }
    }
}

/// Append-only conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// A transcript opened with the assistant greeting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING)],
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a message is already being sent")]
    Busy,
}

/// Per-visitor chat state: the transcript and the in-flight flag.
///
/// Sending is split in two so the caller can release its lock on the session
/// while the request is outstanding: [`ChatSession::begin`] records the user
/// line and marks the session busy, [`ChatSession::finish`] records the bot
/// line and clears it.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: Transcript,
    busy: bool,
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Accept a message for sending and return the text to relay.
    ///
    /// The text is recorded and relayed exactly as typed. Whitespace-only
    /// input is rejected without touching the transcript.
    ///
    /// # Errors
    ///
    /// [`ChatError::EmptyMessage`] for blank input, [`ChatError::Busy`] while
    /// a previous message has not finished.
    pub fn begin(&mut self, input: &str) -> Result<String, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.busy {
            return Err(ChatError::Busy);
        }
        self.transcript.push(ChatMessage::user(input));
        self.busy = true;
        Ok(input.to_string())
    }

    /// Record the bot line for the outstanding message.
    pub fn finish(&mut self, reply: &ChatReply) {
        self.transcript.push(ChatMessage::bot(reply.text()));
        self.busy = false;
    }
}
