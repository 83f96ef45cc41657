//! SQLite post log implementation

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;
use topic_poster_domain::{PostLog, PostLogError, PostRecord};

/// SQLite-backed post log.
///
/// Each append runs in its own transaction. Selection still reads and appends
/// in separate calls, so this does not serialize concurrent invocations.
pub struct SqlitePostLog {
    pool: SqlitePool,
}

impl SqlitePostLog {
    /// Open (or create) the database and its table
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, PostLogError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .map_err(|e| PostLogError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite log (for testing)
    pub async fn in_memory() -> Result<Self, PostLogError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| PostLogError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), PostLogError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                topic_index INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PostLogError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl PostLog for SqlitePostLog {
    async fn load(&self) -> Result<Vec<PostRecord>, PostLogError> {
        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT id, topic_index FROM post_log ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PostLogError::Database(e.to_string()))?;

        rows.into_iter()
            .enumerate()
            .map(|(row, (id, topic_index))| {
                usize::try_from(topic_index)
                    .map(|topic_index| PostRecord { topic_index })
                    .map_err(|e| PostLogError::Corrupt {
                        line: row + 1,
                        message: format!("row id {}: {}", id, e),
                    })
            })
            .collect()
    }

    async fn append(&self, record: PostRecord) -> Result<(), PostLogError> {
        let recorded_at = OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| PostLogError::Database(e.to_string()))?;
        let topic_index = i64::try_from(record.topic_index)
            .map_err(|e| PostLogError::Database(e.to_string()))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PostLogError::Database(e.to_string()))?;

        sqlx::query("INSERT INTO post_log (topic_index, recorded_at) VALUES (?, ?)")
            .bind(topic_index)
            .bind(&recorded_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| PostLogError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PostLogError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_database_is_empty_log() {
        let log = SqlitePostLog::in_memory().await.unwrap();
        assert!(log.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_load_in_order() {
        let log = SqlitePostLog::in_memory().await.unwrap();

        for topic_index in [0, 1, 2, 0] {
            log.append(PostRecord { topic_index }).await.unwrap();
        }

        let indices: Vec<_> = log
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.topic_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("post_log.sqlite");

        {
            let log = SqlitePostLog::new(&path).await.unwrap();
            log.append(PostRecord { topic_index: 4 }).await.unwrap();
            log.pool.close().await;
        }

        let reopened = SqlitePostLog::new(&path).await.unwrap();
        assert_eq!(
            reopened.load().await.unwrap(),
            vec![PostRecord { topic_index: 4 }]
        );
    }
}
