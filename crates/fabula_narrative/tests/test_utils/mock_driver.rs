//! Scripted language model driver.

use async_trait::async_trait;
use fabula_core::{GenerateRequest, GenerateResponse, Output};
use fabula_error::{FabulaResult, ModelsError, ModelsErrorKind};
use fabula_interface::FabulaDriver;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A single scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this text
    Success(String),
    /// Fail with a provider error
    Error(ModelsErrorKind),
    /// Sleep before returning the text
    Delayed(Duration, String),
}

/// Driver that replays scripted responses in order.
///
/// Once the script runs out, the fallback text is returned (or an empty
/// response error if there is none).
pub struct MockDriver {
    script: Mutex<VecDeque<MockResponse>>,
    fallback: Option<String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockDriver {
    pub fn new(script: Vec<MockResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self::new(Vec::new()).with_fallback(text)
    }

    /// Answer with each text in turn.
    pub fn replies<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| MockResponse::Success(t.into()))
                .collect(),
        )
    }

    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FabulaDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        let next = self.script.lock().unwrap().pop_front();

        let text = match next {
            Some(MockResponse::Success(text)) => text,
            Some(MockResponse::Error(kind)) => return Err(ModelsError::new(kind).into()),
            Some(MockResponse::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                text
            }
            None => match &self.fallback {
                Some(text) => text.clone(),
                None => return Err(ModelsError::new(ModelsErrorKind::EmptyResponse).into()),
            },
        };

        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
