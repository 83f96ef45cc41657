//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A single subject that one post is written about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Zero-based position in the topic source, fixed at load time
    pub index: usize,
    /// Display text of the topic
    pub text: String,
}

/// Ordered, read-only list of topics loaded at process start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicSource {
    topics: Vec<Topic>,
}

impl TopicSource {
    /// Build a source from topic texts, assigning indices in iteration order
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Topic {
                index,
                text: text.into(),
            })
            .collect();

        Self { topics }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Topic> {
        self.topics.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }
}

/// One entry in the append-only post log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Index of the topic that was selected
    pub topic_index: usize,
}

/// Rotation position derived from the post log length and topic count.
///
/// Never stored; always recomputed from the full log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationState {
    pub posted_count: usize,
    pub topic_count: usize,
}

impl RotationState {
    /// Returns `None` when there are no topics to rotate over
    pub fn new(posted_count: usize, topic_count: usize) -> Option<Self> {
        if topic_count == 0 {
            return None;
        }
        Some(Self {
            posted_count,
            topic_count,
        })
    }

    /// Zero-based index of the next topic, always `< topic_count`
    pub fn cycle_position(&self) -> usize {
        self.posted_count % self.topic_count
    }

    /// One-based number of the cycle the next post belongs to
    pub fn cycle_number(&self) -> usize {
        self.posted_count / self.topic_count + 1
    }
}

/// A topic chosen by the rotation tracker, with cycle metadata for operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub topic: Topic,
    /// One-based cycle number
    pub cycle_number: usize,
    /// One-based position within the current cycle
    pub position_in_cycle: usize,
    pub total_topics: usize,
    /// Log length before this selection was recorded
    pub posted_count: usize,
}

impl Selection {
    pub fn from_state(topic: Topic, state: RotationState) -> Self {
        Self {
            topic,
            cycle_number: state.cycle_number(),
            position_in_cycle: state.cycle_position() + 1,
            total_topics: state.topic_count,
            posted_count: state.posted_count,
        }
    }
}

/// Encoded raster image returned by an image generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

/// Result of the best-effort illustration step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Image produced and ready to attach
    Generated(GeneratedImage),
    /// Generator failed; the post goes out text-only
    Failed { reason: String },
    /// Image generation is disabled for this run
    Skipped,
}

/// Image bytes plus the metadata the publisher needs to upload them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
    /// Alt text shown by clients
    pub description: Option<String>,
}

/// Handle of a published post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostHandle {
    /// Platform-specific post ID
    pub id: String,
    /// Public URL of the post, if the platform returned one
    pub url: Option<String>,
}

/// Outcome of one orchestrated invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    pub selection: Selection,
    /// Final post text after trimming and truncation
    pub text: String,
    pub image_attached: bool,
    /// Why the image was not attached, if generation failed
    pub image_failure: Option<String>,
    /// Published post; `None` for dry runs
    pub handle: Option<PostHandle>,
    pub dry_run: bool,
}
