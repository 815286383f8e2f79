//! Language model driver trait.

use async_trait::async_trait;
use fabula_core::{GenerateRequest, GenerateResponse};
use fabula_error::FabulaResult;

/// Core trait that all language model backends implement.
///
/// Drivers are constructed once at process start and shared behind an
/// `Arc<dyn FabulaDriver>`.
#[async_trait]
pub trait FabulaDriver: Send + Sync {
    /// Generate model output for a chat request.
    async fn generate(&self, req: &GenerateRequest) -> FabulaResult<GenerateResponse>;

    /// Provider name (e.g., "groq", "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "llama3-70b-8192").
    fn model_name(&self) -> &str;
}
