//! In-memory post log for testing and dry runs

use async_trait::async_trait;
use std::sync::RwLock;
use topic_poster_domain::{PostLog, PostLogError, PostRecord};

/// In-memory post log implementation
pub struct InMemoryPostLog {
    records: RwLock<Vec<PostRecord>>,
}

impl InMemoryPostLog {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Start from existing history
    pub fn with_records(records: Vec<PostRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl Default for InMemoryPostLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostLog for InMemoryPostLog {
    async fn load(&self) -> Result<Vec<PostRecord>, PostLogError> {
        let records = self
            .records
            .read()
            .map_err(|e| PostLogError::Database(e.to_string()))?;
        Ok(records.clone())
    }

    async fn append(&self, record: PostRecord) -> Result<(), PostLogError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| PostLogError::Database(e.to_string()))?;
        records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_preserves_order() {
        let log = InMemoryPostLog::new();

        log.append(PostRecord { topic_index: 2 }).await.unwrap();
        log.append(PostRecord { topic_index: 0 }).await.unwrap();

        let records = log.load().await.unwrap();
        assert_eq!(
            records,
            vec![PostRecord { topic_index: 2 }, PostRecord { topic_index: 0 }]
        );
    }

    #[tokio::test]
    async fn test_with_records_seeds_history() {
        let log = InMemoryPostLog::with_records(vec![PostRecord { topic_index: 0 }; 3]);
        assert_eq!(log.load().await.unwrap().len(), 3);
    }
}
