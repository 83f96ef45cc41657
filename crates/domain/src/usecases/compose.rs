//! Post text composition - prompt construction and local length limits

use crate::model::Topic;

/// Configuration for post text composition
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Length the model is asked to aim for
    pub target_chars: usize,
    /// Hard limit applied locally to whatever the model returns
    pub max_chars: usize,
    /// Number of hashtags the model is asked to end with
    pub hashtags: usize,
    /// Platform named in the prompt
    pub platform_name: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            target_chars: 400,
            max_chars: 450,
            hashtags: 3,
            platform_name: "Mastodon".to_string(),
        }
    }
}

/// Builds prompts for the content generator and finalizes its output
pub struct Composer {
    config: ComposeConfig,
}

impl Composer {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Generate the prompt for a topic
    pub fn build_prompt(&self, topic: &Topic) -> String {
        let mut prompt = format!(
            "Write a {} post of about {} characters about '{}'.",
            self.config.platform_name, self.config.target_chars, topic.text
        );

        if self.config.hashtags > 0 {
            prompt.push_str(&format!(
                " End with {} relevant hashtags.",
                self.config.hashtags
            ));
        }

        prompt.push_str(" Reply with the post text only.");
        prompt
    }

    /// Trim the generated text and cut it to the character budget
    pub fn finalize(&self, raw: &str) -> String {
        truncate_chars(raw.trim(), self.config.max_chars)
    }
}

/// Truncate to at most `max` Unicode scalar values
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}
