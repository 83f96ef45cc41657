//! Illustration prompts and attachment naming

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{GeneratedImage, MediaAttachment, Topic};

/// Configuration for the illustration step
#[derive(Debug, Clone)]
pub struct IllustrateConfig {
    /// Whether to attempt image generation at all
    pub enabled: bool,
    /// Words placed before the topic in the prompt
    pub subject_prefix: String,
    /// Style descriptors; one is picked at random per run
    pub styles: Vec<String>,
    /// Words placed after the style in the prompt
    pub suffix: String,
    /// Attachment filename without extension
    pub file_stem: String,
}

impl Default for IllustrateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subject_prefix: "data science".to_string(),
            styles: default_styles(),
            suffix: "square social art".to_string(),
            file_stem: "thesis_image".to_string(),
        }
    }
}

pub fn default_styles() -> Vec<String> {
    [
        "vibrant illustration, warm tones",
        "artistic concept, earth colors",
        "stylized graphic, autumn palette",
        "surreal art, golden lighting",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub struct Illustrator {
    config: IllustrateConfig,
}

impl Illustrator {
    pub fn new(config: IllustrateConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Build an image prompt for the topic using a randomly chosen style
    pub fn build_prompt<R: Rng + ?Sized>(&self, topic: &Topic, rng: &mut R) -> String {
        let mut parts = Vec::new();

        let subject = format!("{} {}", self.config.subject_prefix.trim(), topic.text);
        parts.push(subject.trim().to_string());

        if let Some(style) = self.config.styles.choose(rng) {
            parts.push(style.clone());
        }

        if !self.config.suffix.trim().is_empty() {
            parts.push(self.config.suffix.trim().to_string());
        }

        parts.join(", ")
    }

    /// Wrap a generated image for upload, using the topic as alt text
    pub fn attachment(&self, image: GeneratedImage, topic: &Topic) -> MediaAttachment {
        let filename = format!("{}.{}", self.config.file_stem, image.extension());
        MediaAttachment {
            bytes: image.bytes,
            mime_type: image.mime_type,
            filename,
            description: Some(topic.text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn topic() -> Topic {
        Topic {
            index: 3,
            text: "gradient descent".to_string(),
        }
    }

    #[test]
    fn test_prompt_contains_topic_and_one_configured_style() {
        let illustrator = Illustrator::new(IllustrateConfig::default());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let prompt = illustrator.build_prompt(&topic(), &mut rng);
            assert!(prompt.starts_with("data science gradient descent, "));
            assert!(prompt.ends_with(", square social art"));
            assert!(default_styles().iter().any(|s| prompt.contains(s.as_str())));
        }
    }

    #[test]
    fn test_prompt_without_styles_or_suffix() {
        let illustrator = Illustrator::new(IllustrateConfig {
            styles: vec![],
            suffix: String::new(),
            subject_prefix: String::new(),
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            illustrator.build_prompt(&topic(), &mut rng),
            "gradient descent"
        );
    }

    #[test]
    fn test_attachment_uses_mime_extension_and_alt_text() {
        let illustrator = Illustrator::new(IllustrateConfig::default());
        let image = GeneratedImage {
            bytes: vec![0xff, 0xd8, 0xff],
            mime_type: "image/jpeg".to_string(),
        };

        let attachment = illustrator.attachment(image, &topic());

        assert_eq!(attachment.filename, "thesis_image.jpg");
        assert_eq!(attachment.mime_type, "image/jpeg");
        assert_eq!(attachment.description.as_deref(), Some("gradient descent"));
        assert_eq!(attachment.bytes.len(), 3);
    }
}
