//! topic-poster adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `topics`: CSV and Excel topic sources
//! - `post_log`: CSV, SQLite and in-memory post logs
//! - `llm`: Chat-completions content generator (OpenAI-compatible, e.g. Groq)
//! - `image`: Hugging Face inference image generator
//! - `mastodon`: Mastodon publisher

mod post_log_csv;
mod post_log_memory;
mod post_log_sqlite;
mod topics_csv;
mod topics_file;
mod topics_xlsx;

pub mod image;
pub mod llm;
pub mod mastodon;

/// Re-exports for topic source adapters
pub mod topics {
    pub use crate::topics_csv::{CsvTopicRepo, TOPIC_COLUMN};
    pub use crate::topics_file::open_topic_repo;
    pub use crate::topics_xlsx::XlsxTopicRepo;
}

/// Re-exports for post log adapters
pub mod post_log {
    pub use crate::post_log_csv::CsvPostLog;
    pub use crate::post_log_memory::InMemoryPostLog;
    pub use crate::post_log_sqlite::SqlitePostLog;
}
