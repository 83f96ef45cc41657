//! Hugging Face inference API adapter for text-to-image models

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use topic_poster_domain::{GeneratedImage, ImageError, ImageGenerator, ImageRequest};

pub const HF_INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Model repository ID
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            model: "stabilityai/stable-diffusion-xl-base-1.0".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Text-to-image generator backed by the Hugging Face inference API
pub struct HuggingFaceImageGenerator {
    client: Client,
    token: SecretString,
    base_url: String,
    config: HuggingFaceConfig,
}

impl HuggingFaceImageGenerator {
    pub fn new(token: SecretString, config: HuggingFaceConfig) -> Result<Self, ImageError> {
        Self::with_base_url(token, HF_INFERENCE_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(
        token: SecretString,
        base_url: String,
        config: HuggingFaceConfig,
    ) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }
}

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    inputs: &'a str,
}

#[async_trait]
impl ImageGenerator for HuggingFaceImageGenerator {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError> {
        let url = format!("{}/models/{}", self.base_url, self.config.model);

        tracing::debug!(model = %self.config.model, "Requesting image");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header("Accept", "image/png")
            .json(&TextToImageRequest {
                inputs: &request.prompt,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageError::Timeout
                } else {
                    ImageError::Api(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(ImageError::RateLimited);
        }

        // Cold models answer 503 while they load
        if status == 503 {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Unavailable(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Api(format!("API returned {}: {}", status, body)));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
            .unwrap_or_default();

        if !mime_type.starts_with("image/") {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::InvalidFormat(format!(
                "Expected an image, got '{}': {}",
                mime_type, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Api(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("Empty image body".to_string()));
        }

        Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PLACEHOLDER_PNG;
    use topic_poster_domain::Topic;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/stabilityai/stable-diffusion-xl-base-1.0";

    fn request() -> ImageRequest {
        ImageRequest {
            topic: Topic {
                index: 2,
                text: "Markov chains".to_string(),
            },
            prompt: "data science Markov chains, surreal art, golden lighting".to_string(),
        }
    }

    fn generator(base_url: String) -> HuggingFaceImageGenerator {
        HuggingFaceImageGenerator::with_base_url(
            SecretString::new("hf-token".into()),
            base_url,
            HuggingFaceConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_image_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("Authorization", "Bearer hf-token"))
            .and(body_json(serde_json::json!({
                "inputs": "data science Markov chains, surreal art, golden lighting"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(PLACEHOLDER_PNG.to_vec(), "image/png"),
            )
            .mount(&mock_server)
            .await;

        let image = generator(mock_server.uri()).generate(request()).await.unwrap();

        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, PLACEHOLDER_PNG);
    }

    #[tokio::test]
    async fn test_model_loading_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Model is currently loading",
                "estimated_time": 20.0
            })))
            .mount(&mock_server)
            .await;

        let result = generator(mock_server.uri()).generate(request()).await;

        assert!(matches!(result, Err(ImageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_json_body_is_invalid_format() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "unexpected"})),
            )
            .mount(&mock_server)
            .await;

        let result = generator(mock_server.uri()).generate(request()).await;

        assert!(matches!(result, Err(ImageError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let result = generator(mock_server.uri()).generate(request()).await;

        assert!(matches!(result, Err(ImageError::RateLimited)));
    }
}
