//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub publisher: PublisherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_topics_path")]
    pub topics_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_backend")]
    pub backend: String,

    #[serde(default = "default_log_path")]
    pub path: PathBuf,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retries: u32,

    #[serde(default = "default_target_chars")]
    pub target_chars: usize,

    #[serde(default = "default_post_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_hashtags")]
    pub hashtags: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_image_provider")]
    pub provider: String,

    #[serde(default = "default_image_model")]
    pub model: String,

    #[serde(default = "default_image_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    #[serde(default = "default_suffix")]
    pub suffix: String,

    #[serde(default = "default_styles")]
    pub styles: Vec<String>,

    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "default_publisher_provider")]
    pub provider: String,

    #[serde(default = "default_mastodon_base_url")]
    pub base_url: String,

    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_visibility")]
    pub visibility: String,

    #[serde(default = "default_status_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_publisher_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_topics_path() -> PathBuf {
    PathBuf::from("./topics.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_backend() -> String {
    "csv".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from("./posted_topics.csv")
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./post_log.sqlite")
}

fn default_llm_provider() -> String {
    "openai_compat".to_string()
}

fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_llm_base_url() -> String {
    topic_poster_adapters::llm::openai_compat::GROQ_BASE_URL.to_string()
}

fn default_llm_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    150
}

fn default_llm_timeout() -> u64 {
    45
}

fn default_target_chars() -> usize {
    400
}

fn default_post_max_chars() -> usize {
    450
}

fn default_hashtags() -> usize {
    3
}

fn default_image_provider() -> String {
    "huggingface".to_string()
}

fn default_image_model() -> String {
    "stabilityai/stable-diffusion-xl-base-1.0".to_string()
}

fn default_image_base_url() -> String {
    topic_poster_adapters::image::HF_INFERENCE_BASE_URL.to_string()
}

fn default_image_api_key_env() -> String {
    "HF_TOKEN".to_string()
}

fn default_image_timeout() -> u64 {
    120
}

fn default_subject_prefix() -> String {
    "data science".to_string()
}

fn default_suffix() -> String {
    "square social art".to_string()
}

fn default_styles() -> Vec<String> {
    topic_poster_domain::usecases::illustrate::default_styles()
}

fn default_file_stem() -> String {
    "thesis_image".to_string()
}

fn default_publisher_provider() -> String {
    "mastodon".to_string()
}

fn default_mastodon_base_url() -> String {
    "https://mastodon.social".to_string()
}

fn default_access_token_env() -> String {
    "MASTODON_TOKEN".to_string()
}

fn default_visibility() -> String {
    "public".to_string()
}

fn default_status_max_chars() -> usize {
    500
}

fn default_publisher_timeout() -> u64 {
    30
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            topics_path: default_topics_path(),
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            backend: default_log_backend(),
            path: default_log_path(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key_env: default_llm_api_key_env(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
            retries: 0,
            target_chars: default_target_chars(),
            max_chars: default_post_max_chars(),
            hashtags: default_hashtags(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: default_image_provider(),
            model: default_image_model(),
            base_url: default_image_base_url(),
            api_key_env: default_image_api_key_env(),
            timeout_secs: default_image_timeout(),
            subject_prefix: default_subject_prefix(),
            suffix: default_suffix(),
            styles: default_styles(),
            file_stem: default_file_stem(),
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            provider: default_publisher_provider(),
            base_url: default_mastodon_base_url(),
            access_token_env: default_access_token_env(),
            visibility: default_visibility(),
            max_chars: default_status_max_chars(),
            timeout_secs: default_publisher_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("TOPIC_POSTER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# topic-poster configuration

[general]
topics_path = "./topics.csv"
log_level = "info"
# Generate the post without recording the topic or publishing
dry_run = false

[log]
backend = "csv"  # csv, sqlite
path = "./posted_topics.csv"
sqlite_path = "./post_log.sqlite"

[llm]
provider = "openai_compat"  # openai_compat, stub
model = "llama-3.1-8b-instant"
base_url = "https://api.groq.com/openai/v1"
api_key_env = "GROQ_API_KEY"
temperature = 0.7
max_output_tokens = 150
timeout_secs = 45
retries = 0
target_chars = 400
max_chars = 450
hashtags = 3

[image]
enabled = true
provider = "huggingface"  # huggingface, stub, failing
model = "stabilityai/stable-diffusion-xl-base-1.0"
base_url = "https://api-inference.huggingface.co"
api_key_env = "HF_TOKEN"
timeout_secs = 120
subject_prefix = "data science"
suffix = "square social art"
styles = [
    "vibrant illustration, warm tones",
    "artistic concept, earth colors",
    "stylized graphic, autumn palette",
    "surreal art, golden lighting",
]
file_stem = "thesis_image"

[publisher]
provider = "mastodon"  # mastodon, stub
base_url = "https://mastodon.social"
access_token_env = "MASTODON_TOKEN"
visibility = "public"  # public, unlisted, private, direct
max_chars = 500
timeout_secs = 30
"#
        .to_string()
    }
}
