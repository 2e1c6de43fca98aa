//! Assistant chat relay.
//!
//! A visitor's message goes to an external assistant endpoint over HTTP.
//! Whatever happens on the wire, the visitor's transcript gains exactly one
//! bot line per sent message: the assistant's reply, or a fixed fallback.

mod relay;
mod transcript;
pub mod transport;

pub use relay::{ChatRelay, ChatReply};
pub use transcript::{ChatError, ChatMessage, ChatSession, Sender, Transcript};
pub use transport::{ChatTransport, HttpChatTransport, TransportError};

/// Bot line used when the assistant cannot be reached.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Sorry, I'm having trouble connecting to the AI. Please try again later.";

/// First line of every new transcript.
pub const GREETING: &str = "Hello! I'm an AI assistant. How can I help you find resources today?";
