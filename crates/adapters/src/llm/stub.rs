//! Stub content generator for testing and offline mode

use async_trait::async_trait;
use topic_poster_domain::{ContentError, ContentGenerator, ContentRequest};

/// Stub generator that returns configurable responses
pub struct StubContentGenerator {
    response: Option<String>,
    error: Option<ContentError>,
}

impl StubContentGenerator {
    /// Create a stub that writes a short post from the topic text
    pub fn echo() -> Self {
        Self {
            response: None,
            error: None,
        }
    }

    /// Create a stub that returns a specific response
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error: None,
        }
    }

    /// Create a stub that always returns an error
    pub fn with_error(error: ContentError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}

impl Default for StubContentGenerator {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl ContentGenerator for StubContentGenerator {
    async fn generate(&self, request: ContentRequest) -> Result<String, ContentError> {
        if let Some(ref error) = self.error {
            return Err(match error {
                ContentError::Api(msg) => ContentError::Api(msg.clone()),
                ContentError::InvalidFormat(msg) => ContentError::InvalidFormat(msg.clone()),
                ContentError::RateLimited => ContentError::RateLimited,
                ContentError::Timeout => ContentError::Timeout,
                ContentError::Config(msg) => ContentError::Config(msg.clone()),
            });
        }

        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        Ok(format!(
            "Today's topic: {}. A quick look at why it matters. #DataScience #Learning #Facts",
            request.topic.text
        ))
    }
}
