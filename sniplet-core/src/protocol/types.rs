//! Wire types for the OpenAI-compatible chat completion API
//!
//! Requests are built by the relay. Stream chunks stay untyped JSON: providers
//! add, omit and null out fields freely, and only `choices[0].delta.content`
//! matters to this crate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// A role-tagged block of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier to use
    pub model: String,

    /// Messages in instruction-precedence order
    pub messages: Vec<ChatMessage>,

    /// Whether the response body is an event stream
    pub stream: bool,
}

/// One `data:` record of a streamed completion
///
/// Any JSON value is accepted; only `choices[0].delta.content` is ever read,
/// so unexpected shapes elsewhere in the record do not cost its text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StreamChunk(Value);

impl StreamChunk {
    /// Text of the first choice's delta, when it is a non-empty string
    pub fn first_delta_text(&self) -> Option<&str> {
        self.0
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}
