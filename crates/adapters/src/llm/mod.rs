//! LLM provider adapters

pub mod openai_compat;
pub mod stub;

pub use openai_compat::OpenAiCompatGenerator;
pub use stub::StubContentGenerator;

use serde::{Deserialize, Serialize};

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-2.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries on failure
    pub retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_output_tokens: 150,
            timeout_secs: 45,
            retries: 0,
        }
    }
}

/// System message sent ahead of every post prompt
pub const SYSTEM_PROMPT: &str = "You write concise, friendly social media posts. \
Output only the post text, with no preamble and no surrounding quotes.";

/// Strip wrapping quotes some models add around the whole post
pub fn clean_generated_text(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
