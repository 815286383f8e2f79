//! Image and video generation collaborator.

use async_trait::async_trait;
use fabula_error::FabulaResult;

/// Generative media backend used by the visual path.
///
/// Every operation returns the URLs of the produced media.
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    /// Generate images from a text prompt.
    async fn text_to_image(&self, prompt: &str) -> FabulaResult<Vec<String>>;

    /// Generate images from an existing image guided by a prompt.
    async fn image_to_image(&self, image_url: &str, prompt: &str) -> FabulaResult<Vec<String>>;

    /// Animate an image into a short video.
    async fn image_to_video(&self, image_url: &str) -> FabulaResult<Vec<String>>;

    /// Upscale an image.
    async fn upscale(&self, image_url: &str, prompt: &str) -> FabulaResult<Vec<String>>;

    /// Provider name.
    fn provider_name(&self) -> &'static str;
}
