//! Append-only CSV post log.
//!
//! One topic index per line, under a `topic_index` header written when the
//! file is created. Files without the header are read as well.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use std::io::SeekFrom;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use topic_poster_domain::{PostLog, PostLogError, PostRecord};

const HEADER: &str = "topic_index";

#[derive(Debug)]
pub struct CsvPostLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvPostLog {
    /// The file is created lazily on the first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(bytes: &[u8]) -> Result<Vec<PostRecord>, PostLogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| PostLogError::Corrupt {
                line: e.position().map(|p| p.line() as usize).unwrap_or_default(),
                message: e.to_string(),
            })?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(row + 1);
            let value = record.get(0).unwrap_or_default();

            if row == 0 && (value == HEADER || value == "index") {
                continue;
            }

            let topic_index = value.parse::<usize>().map_err(|e| PostLogError::Corrupt {
                line,
                message: format!("'{}': {}", value, e),
            })?;

            records.push(PostRecord { topic_index });
        }

        Ok(records)
    }
}

#[async_trait]
impl PostLog for CsvPostLog {
    async fn load(&self) -> Result<Vec<PostRecord>, PostLogError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Post log missing, treating as empty");
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(&bytes)
    }

    async fn append(&self, record: PostRecord) -> Result<(), PostLogError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut chunk = String::new();
        if file.metadata().await?.len() == 0 {
            chunk.push_str(HEADER);
            chunk.push('\n');
        } else {
            // A file edited by hand may lack the final newline
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1)).await?;
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                chunk.push('\n');
            }
        }
        chunk.push_str(&record.topic_index.to_string());
        chunk.push('\n');

        file.write_all(chunk.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;

        Ok(())
    }
}
