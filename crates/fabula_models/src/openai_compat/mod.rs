//! OpenAI chat-completions protocol.

mod client;
mod dto;

pub use client::{OpenAICompatibleClient, RetryPolicy};
pub use dto::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormatSpec};
