//! Protocol module for prompts and chat completion structures
//!
//! This module defines the request the relay sends upstream, the stream chunks
//! it gets back, and the fixed instruction prompts that frame every user
//! prompt.

pub mod prompt;
pub mod types;

pub use prompt::{compose_messages, Prompt, PromptError, STRUCTURE_PROMPT, STYLE_PROMPT};
pub use types::{ChatCompletionRequest, ChatMessage, MessageRole, StreamChunk};
