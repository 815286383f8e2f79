//! Groq LPU inference driver using the OpenAI-compatible client.

use crate::{OpenAICompatibleClient, RetryPolicy};
use async_trait::async_trait;
use fabula_core::{GenerateRequest, GenerateResponse};
use fabula_error::{FabulaResult, ModelsError, ModelsErrorKind, ModelsResult};
use fabula_interface::FabulaDriver;
use tracing::instrument;

/// Groq chat-completions endpoint.
pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Environment variable holding the primary API key.
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
/// Environment variable holding the summarizer API key.
pub const GROQ_SUMMARIZER_API_KEY: &str = "GROQ_API_KEY_SUMMARIZER";

/// Groq LPU inference driver.
#[derive(Debug, Clone)]
pub struct GroqDriver {
    inner: OpenAICompatibleClient,
}

impl GroqDriver {
    /// Creates a new Groq driver.
    ///
    /// Reads API token from `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns error if API token is not set.
    #[instrument(skip_all)]
    pub fn new(model: impl Into<String>) -> ModelsResult<Self> {
        let api_key = read_key(GROQ_API_KEY)?;
        Ok(Self::with_api_key(api_key, model))
    }

    /// Creates a driver for conversation summaries.
    ///
    /// Reads `GROQ_API_KEY_SUMMARIZER`, falling back to `GROQ_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if neither variable is set.
    #[instrument(skip_all)]
    pub fn summarizer(model: impl Into<String>) -> ModelsResult<Self> {
        let api_key = read_key(GROQ_SUMMARIZER_API_KEY).or_else(|_| read_key(GROQ_API_KEY))?;
        Ok(Self::with_api_key(api_key, model))
    }

    /// Creates a new Groq driver with explicit API key.
    pub fn with_api_key(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            inner: OpenAICompatibleClient::new(api_key, model, GROQ_CHAT_URL, "groq"),
        }
    }

    /// Point the driver at another OpenAI-compatible endpoint.
    pub fn with_url(self, url: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_url(url),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self {
            inner: self.inner.with_retry(retry),
        }
    }
}

fn read_key(var: &str) -> ModelsResult<String> {
    std::env::var(var).map_err(|e| {
        ModelsError::new(ModelsErrorKind::Authentication(format!(
            "{} not set: {}",
            var, e
        )))
    })
}

#[async_trait]
impl FabulaDriver for GroqDriver {
    #[instrument(skip(self, req), fields(provider = "groq", model = %self.inner.model_name()))]
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse> {
        Ok(self.inner.complete(req).await?)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_targets_groq() {
        let driver = GroqDriver::with_api_key("key", "llama3-70b-8192");
        assert_eq!(driver.provider_name(), "groq");
        assert_eq!(driver.model_name(), "llama3-70b-8192");
        assert_eq!(driver.inner.url(), GROQ_CHAT_URL);
    }

    #[test]
    fn url_override_keeps_model() {
        let driver = GroqDriver::with_api_key("key", "m").with_url("http://localhost:8080/v1/chat");
        assert_eq!(driver.inner.url(), "http://localhost:8080/v1/chat");
        assert_eq!(driver.model_name(), "m");
    }
}
