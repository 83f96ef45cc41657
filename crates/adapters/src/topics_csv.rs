//! CSV-backed topic source

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use topic_poster_domain::{TopicRepo, TopicSource, TopicSourceError};

/// Name of the column holding topic text
pub const TOPIC_COLUMN: &str = "topic";

/// Topic source read from a CSV file with a `topic` column.
///
/// Row order defines topic indices. Other columns are ignored.
pub struct CsvTopicRepo {
    path: PathBuf,
}

impl CsvTopicRepo {
    /// Create a new CSV topic repo; the file must exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self, TopicSourceError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(TopicSourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Topic file not found: {}", path.display()),
            )));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, bytes: &[u8]) -> Result<TopicSource, TopicSourceError> {
        let file = self.path.display().to_string();
        let parse_error = |e: csv::Error| TopicSourceError::Parse {
            file: file.clone(),
            message: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let column = reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == TOPIC_COLUMN)
            .ok_or_else(|| TopicSourceError::MissingColumn {
                file: file.clone(),
                column: TOPIC_COLUMN.to_string(),
            })?;

        let mut texts = Vec::new();
        for record in reader.records() {
            let record = record.map_err(parse_error)?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            // Blank cells would shift every later index, so reject them
            match record.get(column) {
                Some(text) if !text.is_empty() => texts.push(text.to_string()),
                _ => {
                    return Err(TopicSourceError::Validation(format!(
                        "{}: line {} has an empty '{}' value",
                        file, line, TOPIC_COLUMN
                    )));
                }
            }
        }

        Ok(TopicSource::from_texts(texts))
    }
}

#[async_trait]
impl TopicRepo for CsvTopicRepo {
    async fn load(&self) -> Result<TopicSource, TopicSourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let topics = self.parse(&bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            count = topics.len(),
            "Loaded topics"
        );

        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_topics(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("topics.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_preserves_row_order() {
        let dir = TempDir::new().unwrap();
        let path = write_topics(&dir, "topic\nLinear regression\nDecision trees\nClustering\n");

        let repo = CsvTopicRepo::new(&path).unwrap();
        let topics = repo.load().await.unwrap();

        assert_eq!(topics.len(), 3);
        assert_eq!(topics.get(0).unwrap().text, "Linear regression");
        assert_eq!(topics.get(2).unwrap().index, 2);
        assert_eq!(topics.get(2).unwrap().text, "Clustering");
    }

    #[tokio::test]
    async fn test_load_ignores_other_columns_and_handles_quotes() {
        let dir = TempDir::new().unwrap();
        let path = write_topics(
            &dir,
            "id,topic,notes\n1,\"Overfitting, and how to spot it\",x\n2, P-values ,\n",
        );

        let topics = CsvTopicRepo::new(&path).unwrap().load().await.unwrap();

        assert_eq!(topics.len(), 2);
        assert_eq!(
            topics.get(0).unwrap().text,
            "Overfitting, and how to spot it"
        );
        assert_eq!(topics.get(1).unwrap().text, "P-values");
    }

    #[tokio::test]
    async fn test_missing_topic_column() {
        let dir = TempDir::new().unwrap();
        let path = write_topics(&dir, "subject\nSomething\n");

        let result = CsvTopicRepo::new(&path).unwrap().load().await;

        assert!(matches!(result, Err(TopicSourceError::MissingColumn { .. })));
    }

    #[tokio::test]
    async fn test_blank_topic_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_topics(&dir, "id,topic\n1,First\n2,\n3,Third\n");

        let result = CsvTopicRepo::new(&path).unwrap().load().await;

        assert!(matches!(result, Err(TopicSourceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_header_only_loads_empty_but_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = write_topics(&dir, "topic\n");

        let repo = CsvTopicRepo::new(&path).unwrap();

        assert!(repo.load().await.unwrap().is_empty());
        assert!(matches!(
            repo.validate().await,
            Err(TopicSourceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_byte_order_mark_in_header() {
        let dir = TempDir::new().unwrap();
        let path = write_topics(&dir, "\u{feff}topic\nNeural networks\n");

        let topics = CsvTopicRepo::new(&path).unwrap().load().await.unwrap();

        assert_eq!(topics.get(0).unwrap().text, "Neural networks");
    }

    #[test]
    fn test_nonexistent_file() {
        let result = CsvTopicRepo::new("/nonexistent/topics.csv");
        assert!(result.is_err());
    }
}
