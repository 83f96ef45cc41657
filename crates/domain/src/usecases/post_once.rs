//! Post-once use case - select a topic, generate content, publish

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    model::{ImageOutcome, RunReport, Selection, TopicSource},
    ports::{
        Clock, ContentError, ContentGenerator, ContentRequest, ImageGenerator, ImageRequest,
        PostLog, PostLogError, PublishError, Publisher, TopicRepo, TopicSourceError,
    },
    rotation::{RotationError, RotationTracker},
    usecases::{
        compose::{ComposeConfig, Composer},
        illustrate::{IllustrateConfig, Illustrator},
    },
};

/// Configuration for the post agent
#[derive(Debug, Clone, Default)]
pub struct PostAgentConfig {
    /// Generate content but neither record the topic nor publish
    pub dry_run: bool,
    pub compose: ComposeConfig,
    pub illustrate: IllustrateConfig,
}

/// Orchestrates one post per invocation
pub struct PostAgent<T, L, C, I, P, Cl>
where
    T: TopicRepo + ?Sized,
    L: PostLog + ?Sized,
    C: ContentGenerator + ?Sized,
    I: ImageGenerator + ?Sized,
    P: Publisher + ?Sized,
    Cl: Clock + ?Sized,
{
    topic_repo: Arc<T>,
    tracker: RotationTracker<L>,
    content_generator: Arc<C>,
    image_generator: Arc<I>,
    publisher: Arc<P>,
    clock: Arc<Cl>,
    composer: Composer,
    illustrator: Illustrator,
    dry_run: bool,
}

impl<T, L, C, I, P, Cl> PostAgent<T, L, C, I, P, Cl>
where
    T: TopicRepo + ?Sized,
    L: PostLog + ?Sized,
    C: ContentGenerator + ?Sized,
    I: ImageGenerator + ?Sized,
    P: Publisher + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        topic_repo: Arc<T>,
        post_log: Arc<L>,
        content_generator: Arc<C>,
        image_generator: Arc<I>,
        publisher: Arc<P>,
        clock: Arc<Cl>,
        config: PostAgentConfig,
    ) -> Self {
        Self {
            topic_repo,
            tracker: RotationTracker::new(post_log),
            content_generator,
            image_generator,
            publisher,
            clock,
            composer: Composer::new(config.compose),
            illustrator: Illustrator::new(config.illustrate),
            dry_run: config.dry_run,
        }
    }

    /// Run a single post attempt.
    ///
    /// The topic is recorded as soon as it is selected. A later failure does
    /// not roll the rotation back.
    pub async fn run_once(&self) -> Result<RunReport, AgentError> {
        let run_id = Uuid::new_v4();
        let started_at = self.clock.now();

        let topics = self.topic_repo.load().await?;

        tracing::info!(
            run_id = %run_id,
            topic_count = topics.len(),
            dry_run = self.dry_run,
            "Loaded topic source"
        );

        let selection = self.select(&topics).await?;
        let topic = &selection.topic;

        let request = ContentRequest {
            topic: topic.clone(),
            prompt: self.composer.build_prompt(topic),
        };
        let raw = self.content_generator.generate(request).await?;
        let text = self.composer.finalize(&raw);

        if text.is_empty() {
            return Err(AgentError::ContentGeneration(ContentError::InvalidFormat(
                "Generated text is empty".to_string(),
            )));
        }

        tracing::info!(chars = text.chars().count(), text = %text, "Generated post text");

        let image = self.illustrate(&selection).await;
        let image_failure = match &image {
            ImageOutcome::Failed { reason } => Some(reason.clone()),
            _ => None,
        };
        let image_attached = matches!(image, ImageOutcome::Generated(_));

        if self.dry_run {
            tracing::info!(
                topic = %topic.text,
                image_attached = image_attached,
                "[DRY RUN] Would publish"
            );
            return Ok(RunReport {
                run_id,
                started_at,
                selection,
                text,
                image_attached,
                image_failure,
                handle: None,
                dry_run: true,
            });
        }

        let handle = match image {
            ImageOutcome::Generated(image) => {
                let attachment = self.illustrator.attachment(image, topic);
                self.publisher
                    .post_text_with_image(&text, &attachment)
                    .await?
            }
            ImageOutcome::Failed { .. } | ImageOutcome::Skipped => {
                self.publisher.post_text(&text).await?
            }
        };

        tracing::info!(
            platform = self.publisher.platform(),
            post_id = %handle.id,
            url = ?handle.url,
            "Published post"
        );

        Ok(RunReport {
            run_id,
            started_at,
            selection,
            text,
            image_attached,
            image_failure,
            handle: Some(handle),
            dry_run: false,
        })
    }

    async fn select(&self, topics: &TopicSource) -> Result<Selection, AgentError> {
        if self.dry_run {
            Ok(self.tracker.peek(topics).await?)
        } else {
            Ok(self.tracker.select_next(topics).await?)
        }
    }

    /// Best-effort illustration; every failure becomes `ImageOutcome::Failed`
    async fn illustrate(&self, selection: &Selection) -> ImageOutcome {
        if !self.illustrator.is_enabled() {
            return ImageOutcome::Skipped;
        }

        let prompt = self
            .illustrator
            .build_prompt(&selection.topic, &mut rand::thread_rng());

        tracing::debug!(prompt = %prompt, "Requesting illustration");

        let request = ImageRequest {
            topic: selection.topic.clone(),
            prompt,
        };

        match self.image_generator.generate(request).await {
            Ok(image) => {
                tracing::info!(
                    bytes = image.bytes.len(),
                    mime_type = %image.mime_type,
                    "Generated illustration"
                );
                ImageOutcome::Generated(image)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image generation failed, posting text only");
                ImageOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Errors from a post attempt
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Topic source error: {0}")]
    TopicSource(#[from] TopicSourceError),
    #[error("Post log error: {0}")]
    PostLog(#[from] PostLogError),
    #[error("Content generation failed: {0}")]
    ContentGeneration(#[from] ContentError),
    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),
}

impl From<RotationError> for AgentError {
    fn from(error: RotationError) -> Self {
        let message = error.to_string();
        match error {
            RotationError::EmptyTopicSource => AgentError::Configuration(message),
            RotationError::Log(e) => AgentError::PostLog(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeneratedImage, MediaAttachment, PostHandle, PostRecord};
    use crate::ports::ImageError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    // Fake implementations for testing
    struct FakeTopicRepo {
        topics: Vec<&'static str>,
    }

    #[async_trait]
    impl TopicRepo for FakeTopicRepo {
        async fn load(&self) -> Result<TopicSource, TopicSourceError> {
            Ok(TopicSource::from_texts(self.topics.clone()))
        }
    }

    #[derive(Default)]
    struct FakePostLog {
        records: Mutex<Vec<PostRecord>>,
    }

    impl FakePostLog {
        fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PostLog for FakePostLog {
        async fn load(&self) -> Result<Vec<PostRecord>, PostLogError> {
            Ok(self.records.lock().unwrap().clone())
        }

        async fn append(&self, record: PostRecord) -> Result<(), PostLogError> {
            self.records.lock().unwrap().push(record);
            Ok(())
        }
    }

    struct FakeContentGenerator;

    #[async_trait]
    impl ContentGenerator for FakeContentGenerator {
        async fn generate(&self, request: ContentRequest) -> Result<String, ContentError> {
            Ok(format!("  All about {} #one #two #three\n", request.topic.text))
        }
    }

    struct FailingContentGenerator;

    #[async_trait]
    impl ContentGenerator for FailingContentGenerator {
        async fn generate(&self, _request: ContentRequest) -> Result<String, ContentError> {
            Err(ContentError::Api("boom".to_string()))
        }
    }

    struct FakeImageGenerator {
        fail: bool,
        calls: Mutex<usize>,
    }

    impl FakeImageGenerator {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for FakeImageGenerator {
        async fn generate(&self, _request: ImageRequest) -> Result<GeneratedImage, ImageError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(ImageError::Unavailable("model loading".to_string()));
            }
            Ok(GeneratedImage {
                bytes: vec![0x89, b'P', b'N', b'G'],
                mime_type: "image/png".to_string(),
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Published {
        Text(String),
        WithImage(String, String),
    }

    struct FakePublisher {
        fail: bool,
        published: Mutex<Vec<Published>>,
    }

    impl FakePublisher {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                published: Mutex::new(vec![]),
            }
        }

        fn published(&self) -> Vec<Published> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        async fn post_text(&self, text: &str) -> Result<PostHandle, PublishError> {
            if self.fail {
                return Err(PublishError::Api("down".to_string()));
            }
            self.published
                .lock()
                .unwrap()
                .push(Published::Text(text.to_string()));
            Ok(PostHandle {
                id: "1".to_string(),
                url: Some("https://social.example/@bot/1".to_string()),
            })
        }

        async fn post_text_with_image(
            &self,
            text: &str,
            attachment: &MediaAttachment,
        ) -> Result<PostHandle, PublishError> {
            if self.fail {
                return Err(PublishError::Media("down".to_string()));
            }
            self.published.lock().unwrap().push(Published::WithImage(
                text.to_string(),
                attachment.filename.clone(),
            ));
            Ok(PostHandle {
                id: "2".to_string(),
                url: Some("https://social.example/@bot/2".to_string()),
            })
        }

        fn platform(&self) -> &'static str {
            "fake"
        }
    }

    struct FakeClock {
        time: OffsetDateTime,
    }

    impl Clock for FakeClock {
        fn now(&self) -> OffsetDateTime {
            self.time
        }
    }

    struct Harness {
        log: Arc<FakePostLog>,
        images: Arc<FakeImageGenerator>,
        publisher: Arc<FakePublisher>,
    }

    fn build_agent(
        topics: Vec<&'static str>,
        content: Arc<dyn ContentGenerator>,
        image_fails: bool,
        publish_fails: bool,
        config: PostAgentConfig,
    ) -> (
        PostAgent<
            FakeTopicRepo,
            FakePostLog,
            dyn ContentGenerator,
            FakeImageGenerator,
            FakePublisher,
            FakeClock,
        >,
        Harness,
    ) {
        let log = Arc::new(FakePostLog::default());
        let images = Arc::new(FakeImageGenerator::new(image_fails));
        let publisher = Arc::new(FakePublisher::new(publish_fails));

        let agent = PostAgent::new(
            Arc::new(FakeTopicRepo { topics }),
            Arc::clone(&log),
            content,
            Arc::clone(&images),
            Arc::clone(&publisher),
            Arc::new(FakeClock {
                time: OffsetDateTime::UNIX_EPOCH,
            }),
            config,
        );

        (
            agent,
            Harness {
                log,
                images,
                publisher,
            },
        )
    }

    #[tokio::test]
    async fn test_run_once_publishes_with_image() {
        let (agent, harness) = build_agent(
            vec!["A", "B"],
            Arc::new(FakeContentGenerator),
            false,
            false,
            PostAgentConfig::default(),
        );

        let report = agent.run_once().await.unwrap();

        assert_eq!(report.selection.topic.text, "A");
        assert_eq!(report.text, "All about A #one #two #three");
        assert!(report.image_attached);
        assert!(report.image_failure.is_none());
        assert_eq!(report.handle.unwrap().id, "2");
        assert_eq!(
            harness.publisher.published(),
            vec![Published::WithImage(
                "All about A #one #two #three".to_string(),
                "thesis_image.png".to_string()
            )]
        );
        assert_eq!(harness.log.len(), 1);
    }

    #[tokio::test]
    async fn test_image_failure_falls_back_to_text_only() {
        let (agent, harness) = build_agent(
            vec!["A"],
            Arc::new(FakeContentGenerator),
            true,
            false,
            PostAgentConfig::default(),
        );

        let report = agent.run_once().await.unwrap();

        assert!(!report.image_attached);
        assert!(report.image_failure.unwrap().contains("model loading"));
        assert_eq!(report.handle.unwrap().id, "1");
        assert_eq!(
            harness.publisher.published(),
            vec![Published::Text("All about A #one #two #three".to_string())]
        );
    }

    #[tokio::test]
    async fn test_disabled_images_skip_generator() {
        let config = PostAgentConfig {
            illustrate: IllustrateConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let (agent, harness) =
            build_agent(vec!["A"], Arc::new(FakeContentGenerator), false, false, config);

        let report = agent.run_once().await.unwrap();

        assert!(!report.image_attached);
        assert!(report.image_failure.is_none());
        assert_eq!(*harness.images.calls.lock().unwrap(), 0);
        assert!(matches!(
            harness.publisher.published()[0],
            Published::Text(_)
        ));
    }

    #[tokio::test]
    async fn test_publish_failure_still_advances_rotation() {
        let (agent, harness) = build_agent(
            vec!["A", "B"],
            Arc::new(FakeContentGenerator),
            false,
            true,
            PostAgentConfig::default(),
        );

        let result = agent.run_once().await;
        assert!(matches!(result, Err(AgentError::Publish(_))));
        assert_eq!(harness.log.len(), 1);

        let result = agent.run_once().await;
        assert!(matches!(result, Err(AgentError::Publish(_))));
        assert_eq!(harness.log.len(), 2);
    }

    #[tokio::test]
    async fn test_content_failure_propagates_after_selection() {
        let (agent, harness) = build_agent(
            vec!["A"],
            Arc::new(FailingContentGenerator),
            false,
            false,
            PostAgentConfig::default(),
        );

        let result = agent.run_once().await;

        assert!(matches!(result, Err(AgentError::ContentGeneration(_))));
        assert_eq!(harness.log.len(), 1);
        assert!(harness.publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_empty_topics_is_configuration_error() {
        let (agent, harness) = build_agent(
            vec![],
            Arc::new(FakeContentGenerator),
            false,
            false,
            PostAgentConfig::default(),
        );

        let result = agent.run_once().await;

        assert!(matches!(result, Err(AgentError::Configuration(_))));
        assert_eq!(harness.log.len(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_neither_records_nor_publishes() {
        let config = PostAgentConfig {
            dry_run: true,
            ..Default::default()
        };
        let (agent, harness) =
            build_agent(vec!["A", "B"], Arc::new(FakeContentGenerator), false, false, config);

        let first = agent.run_once().await.unwrap();
        let second = agent.run_once().await.unwrap();

        assert!(first.dry_run);
        assert!(first.handle.is_none());
        assert_eq!(first.selection.topic.text, "A");
        assert_eq!(second.selection.topic.text, "A");
        assert_eq!(harness.log.len(), 0);
        assert!(harness.publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_runs_rotate_topics() {
        let (agent, _harness) = build_agent(
            vec!["A", "B", "C"],
            Arc::new(FakeContentGenerator),
            false,
            false,
            PostAgentConfig::default(),
        );

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(agent.run_once().await.unwrap().selection.topic.text);
        }

        assert_eq!(seen, vec!["A", "B", "C", "A"]);
    }
}
