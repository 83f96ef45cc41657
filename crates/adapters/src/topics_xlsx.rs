//! Excel-backed topic source

use async_trait::async_trait;
use calamine::{Reader, Xlsx};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use topic_poster_domain::{TopicRepo, TopicSource, TopicSourceError};

use crate::topics_csv::TOPIC_COLUMN;

/// Topic source read from the first sheet of an `.xlsx` workbook.
///
/// The first used row is the header and must contain a `topic` cell.
pub struct XlsxTopicRepo {
    path: PathBuf,
}

impl XlsxTopicRepo {
    /// Create a new workbook topic repo; the file must exist
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

    fn parse(&self, bytes: Vec<u8>) -> Result<TopicSource, TopicSourceError> {
        let file = self.path.display().to_string();
        let parse_error = |message: String| TopicSourceError::Parse {
            file: file.clone(),
            message,
        };

        let mut workbook =
            Xlsx::new(Cursor::new(bytes)).map_err(|e| parse_error(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| parse_error("workbook has no sheets".to_string()))?
            .map_err(|e| parse_error(e.to_string()))?;

        let missing_column = || TopicSourceError::MissingColumn {
            file: file.clone(),
            column: TOPIC_COLUMN.to_string(),
        };

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(missing_column)?;
        let column = header
            .iter()
            .position(|cell| cell.to_string().trim() == TOPIC_COLUMN)
            .ok_or_else(missing_column)?;

        // Spreadsheet row number of the header, 1-based
        let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut texts = Vec::new();
        for (offset, row) in rows.enumerate() {
            let text = row
                .get(column)
                .map(|cell| cell.to_string().trim().to_string())
                .unwrap_or_default();

            if text.is_empty() {
                return Err(TopicSourceError::Validation(format!(
                    "{}: row {} has an empty '{}' value",
                    file,
                    header_row + offset + 1,
                    TOPIC_COLUMN
                )));
            }
            texts.push(text);
        }

        Ok(TopicSource::from_texts(texts))
    }
}

#[async_trait]
impl TopicRepo for XlsxTopicRepo {
    async fn load(&self) -> Result<TopicSource, TopicSourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let topics = self.parse(bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            count = topics.len(),
            "Loaded topics"
        );

        Ok(topics)
    }
}
