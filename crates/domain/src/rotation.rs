//! Round-robin topic rotation over an append-only post log
//!
//! The next topic is `topics[len(log) mod len(topics)]`. The log only ever
//! grows, by exactly one record per selection, and there is no explicit reset
//! at the end of a cycle: wraparound falls out of the modulus.
//!
//! Loading the log and appending to it are two separate store calls, so two
//! invocations running at the same time can both pick the same topic and both
//! append. Callers are expected to schedule one invocation at a time.

use std::sync::Arc;

use thiserror::Error;

use crate::model::{PostRecord, RotationState, Selection, TopicSource};
use crate::ports::{PostLog, PostLogError};

/// Errors from topic rotation
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("Topic source is empty; nothing to rotate over")]
    EmptyTopicSource,
    #[error("Post log error: {0}")]
    Log(#[from] PostLogError),
}

/// Pick the next topic for a log of the given contents.
///
/// Returns the selection and the record that must be appended to the log.
pub fn select_next_topic(
    topics: &TopicSource,
    log: &[PostRecord],
) -> Result<(Selection, PostRecord), RotationError> {
    let state =
        RotationState::new(log.len(), topics.len()).ok_or(RotationError::EmptyTopicSource)?;

    let position = state.cycle_position();
    let topic = topics
        .get(position)
        .cloned()
        .ok_or(RotationError::EmptyTopicSource)?;

    let record = PostRecord {
        topic_index: position,
    };

    Ok((Selection::from_state(topic, state), record))
}

/// Rotation tracker bound to a persistent post log
pub struct RotationTracker<L: PostLog + ?Sized> {
    log: Arc<L>,
}

impl<L: PostLog + ?Sized> Clone for RotationTracker<L> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<L: PostLog + ?Sized> RotationTracker<L> {
    pub fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Current rotation state, recomputed from the full log
    pub async fn state(&self, topics: &TopicSource) -> Result<RotationState, RotationError> {
        let records = self.log.load().await?;
        RotationState::new(records.len(), topics.len()).ok_or(RotationError::EmptyTopicSource)
    }

    /// Compute the next selection without recording it
    pub async fn peek(&self, topics: &TopicSource) -> Result<Selection, RotationError> {
        if topics.is_empty() {
            return Err(RotationError::EmptyTopicSource);
        }

        let records = self.log.load().await?;
        let (selection, _) = select_next_topic(topics, &records)?;
        Ok(selection)
    }

    /// Select the next topic and append it to the log.
    ///
    /// The append happens before anything downstream runs, so the rotation
    /// advances even if the post later fails.
    pub async fn select_next(&self, topics: &TopicSource) -> Result<Selection, RotationError> {
        if topics.is_empty() {
            return Err(RotationError::EmptyTopicSource);
        }

        let records = self.log.load().await?;
        let (selection, record) = select_next_topic(topics, &records)?;

        self.log.append(record).await?;

        tracing::info!(
            topic_index = selection.topic.index,
            cycle_number = selection.cycle_number,
            position = selection.position_in_cycle,
            total_topics = selection.total_topics,
            topic = %selection.topic.text,
            "Selected topic"
        );

        Ok(selection)
    }
}
