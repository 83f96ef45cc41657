//! Mastodon API adapter for publishing statuses with optional media

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use topic_poster_domain::{MediaAttachment, PostHandle, PublishError, Publisher};
use uuid::Uuid;

/// Who can see a published status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" => Ok(Self::Private),
            "direct" => Ok(Self::Direct),
            other => Err(format!("Invalid Mastodon visibility: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MastodonConfig {
    pub visibility: Visibility,
    /// Instance character limit for a status
    pub max_chars: usize,
    pub timeout_secs: u64,
    /// How often to poll an upload that is still processing
    pub media_poll_attempts: u32,
    pub media_poll_interval: Duration,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            visibility: Visibility::Public,
            max_chars: 500,
            timeout_secs: 30,
            media_poll_attempts: 10,
            media_poll_interval: Duration::from_secs(1),
        }
    }
}

/// Mastodon publisher for creating statuses
pub struct MastodonPublisher {
    client: Client,
    access_token: SecretString,
    base_url: String,
    config: MastodonConfig,
}

impl MastodonPublisher {
    pub fn new(
        access_token: SecretString,
        base_url: String,
        config: MastodonConfig,
    ) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PublishError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }

    fn check_length(&self, text: &str) -> Result<(), PublishError> {
        let len = text.chars().count();
        if len > self.config.max_chars {
            return Err(PublishError::ContentTooLong {
                len,
                max: self.config.max_chars,
            });
        }
        Ok(())
    }

    async fn upload_media(&self, attachment: &MediaAttachment) -> Result<String, PublishError> {
        let part = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.filename.clone())
            .mime_str(&attachment.mime_type)
            .map_err(|e| PublishError::Media(e.to_string()))?;

        let mut form = Form::new().part("file", part);
        if let Some(ref description) = attachment.description {
            form = form.text("description", description.clone());
        }

        let url = format!("{}/api/v2/media", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::Media(e.to_string()))?;

        let status = response.status();
        let response = check_status(response, "upload media").await?;

        let media: MediaResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Media(e.to_string()))?;

        tracing::debug!(media_id = %media.id, bytes = attachment.bytes.len(), "Uploaded media");

        // 202 means the server is still processing the file
        if status == StatusCode::ACCEPTED {
            self.wait_for_media(&media.id).await?;
        }

        Ok(media.id)
    }

    async fn wait_for_media(&self, media_id: &str) -> Result<(), PublishError> {
        let url = format!("{}/api/v1/media/{}", self.base_url, media_id);

        for attempt in 0..self.config.media_poll_attempts {
            tokio::time::sleep(self.config.media_poll_interval).await;

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.bearer())
                .send()
                .await
                .map_err(|e| PublishError::Media(e.to_string()))?;

            if response.status() == StatusCode::OK {
                return Ok(());
            }

            if response.status() != StatusCode::PARTIAL_CONTENT {
                check_status(response, "poll media").await?;
            }

            tracing::debug!(media_id = %media_id, attempt = attempt + 1, "Media still processing");
        }

        Err(PublishError::Media(format!(
            "Media {} still processing after {} checks",
            media_id, self.config.media_poll_attempts
        )))
    }

    async fn create_status(
        &self,
        text: &str,
        media_ids: Vec<String>,
    ) -> Result<PostHandle, PublishError> {
        let request = CreateStatusRequest {
            status: text.to_string(),
            media_ids,
            visibility: self.config.visibility,
        };

        let url = format!("{}/api/v1/statuses", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        let response = check_status(response, "create status").await?;

        let created: StatusResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;

        Ok(PostHandle {
            id: created.id,
            url: created.url.or(created.uri),
        })
    }
}

async fn check_status(response: Response, action: &str) -> Result<Response, PublishError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PublishError::Auth("Invalid or insufficient access token".to_string()));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PublishError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PublishError::Api(format!(
            "Failed to {}: {} {}",
            action, status, body
        )));
    }

    Ok(response)
}

#[derive(Serialize)]
struct CreateStatusRequest {
    status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    media_ids: Vec<String>,
    visibility: Visibility,
}

#[derive(Deserialize)]
struct MediaResponse {
    id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    id: String,
    url: Option<String>,
    uri: Option<String>,
}

#[async_trait]
impl Publisher for MastodonPublisher {
    async fn post_text(&self, text: &str) -> Result<PostHandle, PublishError> {
        self.check_length(text)?;
        self.create_status(text, vec![]).await
    }

    async fn post_text_with_image(
        &self,
        text: &str,
        attachment: &MediaAttachment,
    ) -> Result<PostHandle, PublishError> {
        self.check_length(text)?;
        let media_id = self.upload_media(attachment).await?;
        self.create_status(text, vec![media_id]).await
    }

    fn platform(&self) -> &'static str {
        "mastodon"
    }
}
