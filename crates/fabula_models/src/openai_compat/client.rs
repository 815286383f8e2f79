//! Client for OpenAI-compatible chat-completions endpoints.

use super::dto::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormatSpec};
use async_trait::async_trait;
use derive_getters::Getters;
use fabula_core::{GenerateRequest, GenerateResponse, Output, ResponseFormat};
use fabula_error::{FabulaResult, ModelsError, ModelsErrorKind, ModelsResult};
use fabula_interface::FabulaDriver;
use reqwest::Client;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Backoff settings for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    max_retries: usize,
    /// First backoff delay in milliseconds
    initial_backoff_ms: u64,
    /// Upper bound on any single delay, in seconds
    max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_delay_secs: 8,
        }
    }
}

impl RetryPolicy {
    /// Policy with explicit settings.
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_delay_secs: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_delay_secs,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }
}

/// OpenAI-compatible chat-completions client.
///
/// Retries rate-limit, server, and transport failures with jittered
/// exponential backoff; all other failures return immediately.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
    provider: &'static str,
    retry: RetryPolicy,
}

impl OpenAICompatibleClient {
    /// Creates a client for the chat-completions endpoint at `url`.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        url: impl Into<String>,
        provider: &'static str,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            url: url.into(),
            provider,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Translate a generation request into the wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if the request has no messages.
    pub fn build_request(&self, req: &GenerateRequest) -> ModelsResult<ChatCompletionRequest> {
        if req.messages.is_empty() {
            return Err(ModelsError::new(ModelsErrorKind::Builder(
                "request has no messages".to_string(),
            )));
        }

        let response_format = match req.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(ResponseFormatSpec::from(ResponseFormat::JsonObject)),
        };

        ChatCompletionRequest::builder()
            .model(req.model.clone().unwrap_or_else(|| self.model.clone()))
            .messages(req.messages.iter().map(ChatMessage::from).collect::<Vec<_>>())
            .temperature(req.temperature)
            .max_tokens(req.max_tokens)
            .response_format(response_format)
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))
    }

    async fn send_once(&self, body: &ChatCompletionRequest) -> ModelsResult<ChatCompletionResponse> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ModelsError::new(ModelsErrorKind::Http(format!("Request failed: {}", e))))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let kind = if status.as_u16() == 401 || status.as_u16() == 403 {
                ModelsErrorKind::Authentication(message)
            } else {
                ModelsErrorKind::Api {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(ModelsError::new(kind));
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| {
            ModelsError::new(ModelsErrorKind::MalformedResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }

    /// Send a request, retrying transient failures.
    #[instrument(skip(self, req), fields(provider = self.provider, model = %self.model))]
    pub async fn complete(&self, req: &GenerateRequest) -> ModelsResult<GenerateResponse> {
        let body = self.build_request(req)?;
        debug!(messages = body.messages().len(), "Sending chat completion");

        let strategy = ExponentialBackoff::from_millis(self.retry.initial_backoff_ms.max(1))
            .factor(2)
            .max_delay(Duration::from_secs(self.retry.max_delay_secs))
            .map(jitter)
            .take(self.retry.max_retries);

        let client = self;
        let body = &body;
        let response = Retry::spawn(strategy, || async move {
            match client.send_once(body).await {
                Ok(response) => Ok(response),
                Err(e) if e.kind.is_retryable() => {
                    warn!(error = %e, "Chat completion failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await?;

        let content = response
            .first_content()
            .ok_or_else(|| ModelsError::new(ModelsErrorKind::EmptyResponse))?;
        debug!(chars = content.len(), "Received chat completion");

        Ok(GenerateResponse {
            outputs: vec![Output::Text(content.to_string())],
        })
    }
}

#[async_trait]
impl FabulaDriver for OpenAICompatibleClient {
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse> {
        Ok(self.complete(req).await?)
    }

    fn provider_name(&self) -> &'static str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::Message;

    fn client() -> OpenAICompatibleClient {
        OpenAICompatibleClient::new("key", "default-model", "http://localhost/v1", "test")
    }

    #[test]
    fn request_uses_default_model_and_json_mode() {
        let req = GenerateRequest::builder()
            .messages(vec![Message::system("s"), Message::user("u")])
            .response_format(ResponseFormat::JsonObject)
            .build()
            .unwrap();

        let body = client().build_request(&req).unwrap();
        assert_eq!(body.model(), "default-model");
        assert_eq!(body.messages().len(), 2);
        assert_eq!(
            body.response_format().as_ref().map(|f| f.kind.as_str()),
            Some("json_object")
        );
    }

    #[test]
    fn request_model_override_wins() {
        let req = GenerateRequest::builder()
            .messages(vec![Message::user("u")])
            .model(Some("other".to_string()))
            .build()
            .unwrap();
        assert_eq!(client().build_request(&req).unwrap().model(), "other");
        assert!(client().build_request(&req).unwrap().response_format().is_none());
    }

    #[test]
    fn empty_request_is_rejected() {
        assert!(client().build_request(&GenerateRequest::default()).is_err());
    }
}
