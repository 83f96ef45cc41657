//! Image generation adapters

mod huggingface;

pub use huggingface::{HF_INFERENCE_BASE_URL, HuggingFaceConfig, HuggingFaceImageGenerator};

use async_trait::async_trait;
use topic_poster_domain::{GeneratedImage, ImageError, ImageGenerator, ImageRequest};

/// 1x1 transparent PNG
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Stub image generator for testing and offline mode
pub struct StubImageGenerator {
    failure: Option<String>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl StubImageGenerator {
    /// Always returns a tiny placeholder PNG
    pub fn placeholder() -> Self {
        Self {
            failure: None,
            prompts: std::sync::Mutex::new(vec![]),
        }
    }

    /// Always fails with the given reason
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            prompts: std::sync::Mutex::new(vec![]),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt);
        }

        if let Some(ref reason) = self.failure {
            return Err(ImageError::Api(reason.clone()));
        }

        Ok(GeneratedImage {
            bytes: PLACEHOLDER_PNG.to_vec(),
            mime_type: "image/png".to_string(),
        })
    }
}
