//! Language model provider integrations for Fabula.
//!
//! Every provider speaks the OpenAI chat-completions protocol through
//! [`OpenAICompatibleClient`]; provider drivers are thin presets around it.
//!
//! # Available Providers
//!
//! - **Groq** - Enable with `groq` feature (default)
//!
//! ```no_run
//! use fabula_core::{GenerateRequest, Message, ResponseFormat};
//! use fabula_interface::FabulaDriver;
//! use fabula_models::GroqDriver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = GroqDriver::new("llama3-70b-8192")?;
//! let request = GenerateRequest::builder()
//!     .messages(vec![Message::user("Return {\"ok\": true}")])
//!     .response_format(ResponseFormat::JsonObject)
//!     .build()?;
//! let response = driver.generate(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai_compat;

pub use openai_compat::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, OpenAICompatibleClient,
    ResponseFormatSpec, RetryPolicy,
};

#[cfg(feature = "groq")]
mod groq;

#[cfg(feature = "groq")]
pub use groq::{GROQ_API_KEY, GROQ_CHAT_URL, GROQ_SUMMARIZER_API_KEY, GroqDriver};
