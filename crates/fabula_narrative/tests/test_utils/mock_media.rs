//! Media generator returning predictable URLs.

use async_trait::async_trait;
use fabula_error::{FabulaResult, HttpError};
use fabula_interface::MediaGenerator;
use std::sync::Mutex;

pub struct MockMedia {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl MockMedia {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn respond(&self, input: &str, url: String) -> FabulaResult<Vec<String>> {
        self.prompts.lock().unwrap().push(input.to_string());
        if self.fail {
            return Err(HttpError::new("media backend unavailable").into());
        }
        Ok(vec![url])
    }
}

#[async_trait]
impl MediaGenerator for MockMedia {
    async fn text_to_image(&self, prompt: &str) -> FabulaResult<Vec<String>> {
        let n = self.prompts.lock().unwrap().len();
        self.respond(prompt, format!("https://media.test/image-{}.png", n))
    }

    async fn image_to_image(&self, image_url: &str, prompt: &str) -> FabulaResult<Vec<String>> {
        self.respond(prompt, format!("{}?edit", image_url))
    }

    async fn image_to_video(&self, image_url: &str) -> FabulaResult<Vec<String>> {
        self.respond(image_url, format!("{}.mp4", image_url.trim_end_matches(".png")))
    }

    async fn upscale(&self, image_url: &str, prompt: &str) -> FabulaResult<Vec<String>> {
        self.respond(prompt, format!("{}?upscaled", image_url))
    }

    fn provider_name(&self) -> &'static str {
        "mock-media"
    }
}
