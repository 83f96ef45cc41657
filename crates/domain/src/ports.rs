//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{GeneratedImage, MediaAttachment, PostHandle, PostRecord, Topic, TopicSource};

/// Error type for topic source loading
#[derive(Debug, Error)]
pub enum TopicSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },
    #[error("Column '{column}' not found in {file}")]
    MissingColumn { file: String, column: String },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Port for loading the ordered topic list
#[async_trait]
pub trait TopicRepo: Send + Sync {
    /// Load all topics in source order; an empty source is not an error here
    async fn load(&self) -> Result<TopicSource, TopicSourceError>;

    /// Validate the source, rejecting an empty one
    async fn validate(&self) -> Result<(), TopicSourceError> {
        let topics = self.load().await?;
        if topics.is_empty() {
            return Err(TopicSourceError::Validation(
                "topic source contains no topics".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for post log operations
#[derive(Debug, Error)]
pub enum PostLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt post log entry at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

/// Port for the append-only post log.
///
/// A store that does not exist yet must load as an empty sequence.
#[async_trait]
pub trait PostLog: Send + Sync {
    /// Load every record in append order
    async fn load(&self) -> Result<Vec<PostRecord>, PostLogError>;

    /// Append one record and persist it before returning
    async fn append(&self, record: PostRecord) -> Result<(), PostLogError>;
}

/// Error type for content generation
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Prompt sent to the content generator
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub topic: Topic,
    pub prompt: String,
}

/// Port for LLM-based post text generation
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce raw post text; the caller trims and truncates it
    async fn generate(&self, request: ContentRequest) -> Result<String, ContentError>;
}

/// Error type for image generation
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
}

/// Prompt sent to the image generator
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub topic: Topic,
    pub prompt: String,
}

/// Port for illustration generation
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: ImageRequest) -> Result<GeneratedImage, ImageError>;
}

/// Error type for publisher operations
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Content too long: {len} > {max}")]
    ContentTooLong { len: usize, max: usize },
    #[error("Media upload failed: {0}")]
    Media(String),
}

/// Port for publishing posts to the social network
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a text-only post
    async fn post_text(&self, text: &str) -> Result<PostHandle, PublishError>;

    /// Upload the attachment and publish a post referencing it
    async fn post_text_with_image(
        &self,
        text: &str,
        attachment: &MediaAttachment,
    ) -> Result<PostHandle, PublishError>;

    /// Get the platform name (e.g., "mastodon")
    fn platform(&self) -> &'static str;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
