//! Conversation sessions backed by a story's history.

use crate::prompt::PromptBuilder;
use derive_getters::Getters;
use fabula_core::{GenerateRequest, Message, ResponseFormat, Story};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use fabula_interface::{FabulaDriver, StoryRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Conversation session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SessionConfig {
    /// Upper bound on one model call, in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Sampling temperature
    #[serde(default)]
    temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default)]
    max_tokens: Option<u32>,

    /// Whether to refresh the rolling summary after each exchange
    #[serde(default = "default_summarize")]
    summarize: bool,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_summarize() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            temperature: None,
            max_tokens: None,
            summarize: default_summarize(),
        }
    }
}

/// One completed user/assistant exchange, not yet recorded.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct SessionTurn {
    /// User input as sent
    user: Message,
    /// Raw model output
    assistant: Message,
}

impl SessionTurn {
    /// Raw model output text.
    pub fn output(&self) -> &str {
        &self.assistant.content
    }
}

/// Sends prompts to the model in the context of a story's conversation.
///
/// Each request carries the system prompt, the rolling summary, and the new
/// user input; the full history is persisted but never resent. The caller
/// stores the returned [`SessionTurn`] once the output has been used, then
/// hands it to [`summarize`](Self::summarize).
#[derive(Clone)]
pub struct ConversationSession {
    driver: Arc<dyn FabulaDriver>,
    summarizer: Option<Arc<dyn FabulaDriver>>,
    repository: Arc<dyn StoryRepository>,
    prompts: PromptBuilder,
    config: SessionConfig,
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("provider", &self.driver.provider_name())
            .field("model", &self.driver.model_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConversationSession {
    /// Create a session using `driver` for generation.
    pub fn new(
        driver: Arc<dyn FabulaDriver>,
        repository: Arc<dyn StoryRepository>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            driver,
            summarizer: None,
            repository,
            prompts,
            config: SessionConfig::default(),
        }
    }

    /// Use a separate driver for summary refreshes.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn FabulaDriver>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Replace the session settings.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one model call for `story`.
    ///
    /// Nothing is persisted here.
    ///
    /// # Errors
    ///
    /// `GenerationFailed` if the driver errors, times out, or returns empty
    /// output.
    #[tracing::instrument(
        skip(self, story, system_prompt, user_input),
        fields(story_id = %story.id, provider = self.driver.provider_name(), model = self.driver.model_name())
    )]
    pub async fn invoke(
        &self,
        story: &Story,
        system_prompt: &str,
        user_input: &str,
    ) -> FabulaResult<SessionTurn> {
        let system = self
            .prompts
            .chat_frame(system_prompt, story.summary.as_deref())?;
        let user = Message::user(user_input);

        let request = GenerateRequest {
            messages: vec![Message::system(system), user.clone()],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            model: None,
            response_format: ResponseFormat::JsonObject,
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = match tokio::time::timeout(timeout, self.driver.generate(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Model call failed");
                return Err(generation_failed(e.message()));
            }
            Err(_) => {
                tracing::error!(timeout_secs = self.config.timeout_secs, "Model call timed out");
                return Err(generation_failed(format!(
                    "model call timed out after {}s",
                    self.config.timeout_secs
                )));
            }
        };

        let output = response.text();
        if output.trim().is_empty() {
            tracing::error!("Model returned empty output");
            return Err(generation_failed("model returned empty output"));
        }

        tracing::debug!(output_len = output.len(), "Model call succeeded");

        Ok(SessionTurn {
            user,
            assistant: Message::assistant(output),
        })
    }

    /// Fold a recorded exchange into the story's rolling summary.
    ///
    /// Does nothing when summaries are disabled. A failed refresh is logged
    /// and the previous summary kept.
    #[tracing::instrument(skip(self, story, turn), fields(story_id = %story.id))]
    pub async fn summarize(&self, story: &Story, turn: &SessionTurn) {
        if !self.config.summarize {
            return;
        }
        if let Err(e) = self.refresh_summary(story, turn).await {
            tracing::warn!(error = %e, "Summary refresh failed; keeping previous summary");
        }
    }

    async fn refresh_summary(&self, story: &Story, turn: &SessionTurn) -> FabulaResult<()> {
        let driver = self.summarizer.as_ref().unwrap_or(&self.driver);
        let new_lines = format!(
            "Human: {}\nAI: {}",
            turn.user.content, turn.assistant.content
        );
        let prompt = self
            .prompts
            .summary_prompt(story.summary.as_deref(), &new_lines)?;

        let request = GenerateRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: self.config.max_tokens,
            temperature: Some(0.0),
            model: None,
            response_format: ResponseFormat::Text,
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = tokio::time::timeout(timeout, driver.generate(&request))
            .await
            .map_err(|_| generation_failed("summary call timed out"))??;

        let summary = response.text();
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(generation_failed("summarizer returned empty output"));
        }

        self.repository.set_summary(story.id, summary).await?;
        tracing::debug!(summary_len = summary.len(), "Conversation summary refreshed");
        Ok(())
    }
}

fn generation_failed(message: impl Into<String>) -> fabula_error::FabulaError {
    StoryError::new(StoryErrorKind::GenerationFailed(message.into())).into()
}
