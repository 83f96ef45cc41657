//! OpenAI-compatible chat completions adapter (Groq, OpenAI, and friends)

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use topic_poster_domain::{ContentError, ContentGenerator, ContentRequest};

use super::{LlmConfig, SYSTEM_PROMPT, clean_generated_text};

/// Groq's OpenAI-compatible endpoint
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Content generator for any OpenAI-compatible chat completions API
pub struct OpenAiCompatGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: LlmConfig,
}

impl OpenAiCompatGenerator {
    pub fn new(
        api_key: SecretString,
        base_url: String,
        config: LlmConfig,
    ) -> Result<Self, ContentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ContentError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    async fn call_api(&self, prompt: &str) -> Result<String, ContentError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_output_tokens),
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ContentError::Timeout
                } else {
                    ContentError::Api(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(ContentError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Api(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ContentError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        let text = clean_generated_text(&text);
        if text.is_empty() {
            return Err(ContentError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

const RETRY_BASE_MS: u64 = 500;
const RETRY_MAX_MS: u64 = 30_000;

/// Exponential backoff before retry `attempt`, capped at 30s
fn retry_delay(attempt: u32) -> Duration {
    let millis = RETRY_BASE_MS.saturating_mul(2_u64.saturating_pow(attempt));
    Duration::from_millis(millis.min(RETRY_MAX_MS))
}

#[async_trait]
impl ContentGenerator for OpenAiCompatGenerator {
    async fn generate(&self, request: ContentRequest) -> Result<String, ContentError> {
        tracing::debug!(
            model = %self.config.model,
            topic_index = request.topic.index,
            "Requesting post text"
        );

        let mut last_error = None;
        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                tracing::warn!(attempt = attempt, "Retrying content generation");
                tokio::time::sleep(retry_delay(attempt)).await;
            }

            match self.call_api(&request.prompt).await {
                Ok(text) => return Ok(text),
                Err(ContentError::RateLimited) => return Err(ContentError::RateLimited),
                Err(e) => {
                    tracing::warn!(error = %e, "Content generation attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ContentError::Api("Unknown error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topic_poster_domain::Topic;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> ContentRequest {
        ContentRequest {
            topic: Topic {
                index: 0,
                text: "Central limit theorem".to_string(),
            },
            prompt: "Write a post about 'Central limit theorem'".to_string(),
        }
    }

    fn generator(base_url: String, retries: u32) -> OpenAiCompatGenerator {
        OpenAiCompatGenerator::new(
            SecretString::new("test-key".into()),
            base_url,
            LlmConfig {
                retries,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "max_tokens": 150
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "\"Averages behave. #stats #clt #data\""}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let text = generator(mock_server.uri(), 0)
            .generate(sample_request())
            .await
            .unwrap();

        assert_eq!(text, "Averages behave. #stats #clt #data");
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = generator(mock_server.uri(), 2)
            .generate(sample_request())
            .await;

        assert!(matches!(result, Err(ContentError::RateLimited)));
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let result = generator(mock_server.uri(), 0)
            .generate(sample_request())
            .await;

        match result {
            Err(ContentError::Api(message)) => assert!(message.contains("overloaded")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&mock_server)
            .await;

        let result = generator(mock_server.uri(), 0)
            .generate(sample_request())
            .await;

        assert!(matches!(result, Err(ContentError::InvalidFormat(_))));
    }

    #[test]
    fn test_retry_delay_doubles_then_caps() {
        assert_eq!(retry_delay(1), Duration::from_millis(1_000));
        assert_eq!(retry_delay(2), Duration::from_millis(2_000));
        assert_eq!(retry_delay(6), Duration::from_millis(30_000));
        assert_eq!(retry_delay(64), Duration::from_millis(30_000));
        assert_eq!(retry_delay(u32::MAX), Duration::from_millis(30_000));
    }
}
