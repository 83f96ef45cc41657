//! Mastodon publishing adapters

mod publish;

pub use publish::{MastodonConfig, MastodonPublisher, Visibility};

use async_trait::async_trait;
use topic_poster_domain::{MediaAttachment, PostHandle, PublishError, Publisher};
use uuid::Uuid;

/// A post captured by [`StubPublisher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: String,
    pub text: String,
    /// Filename of the attached image, if any
    pub attachment: Option<String>,
}

/// Stub publisher for testing and offline mode
pub struct StubPublisher {
    enabled: bool,
    published: std::sync::Mutex<Vec<PublishedPost>>,
}

impl StubPublisher {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            published: std::sync::Mutex::new(vec![]),
        }
    }

    /// Get all posts that were published
    pub fn get_published(&self) -> Vec<PublishedPost> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn record(
        &self,
        text: &str,
        attachment: Option<&MediaAttachment>,
    ) -> Result<PostHandle, PublishError> {
        if !self.enabled {
            return Err(PublishError::Api("Publisher disabled".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        if let Ok(mut published) = self.published.lock() {
            published.push(PublishedPost {
                id: id.clone(),
                text: text.to_string(),
                attachment: attachment.map(|a| a.filename.clone()),
            });
        }

        Ok(PostHandle {
            url: Some(format!("https://mastodon.invalid/@stub/{}", id)),
            id,
        })
    }
}

#[async_trait]
impl Publisher for StubPublisher {
    async fn post_text(&self, text: &str) -> Result<PostHandle, PublishError> {
        self.record(text, None)
    }

    async fn post_text_with_image(
        &self,
        text: &str,
        attachment: &MediaAttachment,
    ) -> Result<PostHandle, PublishError> {
        self.record(text, Some(attachment))
    }

    fn platform(&self) -> &'static str {
        "stub"
    }
}
