//! Run command - post once about the next topic in rotation

use anyhow::{Context, Result, bail};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use topic_poster_adapters::{
    image::{HuggingFaceConfig, HuggingFaceImageGenerator, StubImageGenerator},
    llm::{LlmConfig as AdapterLlmConfig, OpenAiCompatGenerator, StubContentGenerator},
    mastodon::{MastodonConfig, MastodonPublisher, StubPublisher, Visibility},
    post_log::{CsvPostLog, SqlitePostLog},
    topics::open_topic_repo,
};
use topic_poster_domain::{
    ContentGenerator, ImageGenerator, PostLog, Publisher, RunReport, SystemClock,
    usecases::{ComposeConfig, IllustrateConfig, PostAgent, PostAgentConfig},
};

use crate::args::RunArgs;
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let dry_run = args.dry_run || config.general.dry_run;
    let image_enabled = config.image.enabled && !args.no_image;

    tracing::info!(
        dry_run = dry_run,
        image_enabled = image_enabled,
        topics = %config.general.topics_path.display(),
        log_backend = %config.log.backend,
        llm = %config.llm.provider,
        publisher = %config.publisher.provider,
        "Starting topic-poster run"
    );

    // Every secret is resolved before any network call
    let credentials = Credentials::resolve(&config, image_enabled, !dry_run)?;

    let topic_repo =
        open_topic_repo(&config.general.topics_path).context("Failed to open topic source")?;
    let post_log = build_post_log(&config).await?;
    let content_generator = build_content_generator(&config, credentials.llm)?;
    let image_generator = build_image_generator(&config, image_enabled, credentials.image)?;
    let publisher = build_publisher(&config, dry_run, credentials.publisher)?;

    let agent = PostAgent::new(
        topic_repo,
        post_log,
        content_generator,
        image_generator,
        publisher,
        Arc::new(SystemClock),
        agent_config(&config, dry_run, image_enabled),
    );

    let report = agent.run_once().await.context("Post run failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    tracing::info!(run_id = %report.run_id, "topic-poster run completed");
    Ok(())
}

fn print_report(report: &RunReport) {
    let selection = &report.selection;
    println!(
        "Topic {}/{} (cycle {}): {}",
        selection.position_in_cycle,
        selection.total_topics,
        selection.cycle_number,
        selection.topic.text
    );
    println!();
    println!("{}", report.text);
    println!();

    if let Some(ref reason) = report.image_failure {
        println!("Image: failed ({}), posted text only", reason);
    } else if report.image_attached {
        println!("Image: attached");
    }

    match report.handle {
        Some(ref handle) => match handle.url {
            Some(ref url) => println!("Posted: {}", url),
            None => println!("Posted: {}", handle.id),
        },
        None if report.dry_run => println!("[DRY RUN] Nothing recorded or published"),
        None => {}
    }
}

fn agent_config(config: &AppConfig, dry_run: bool, image_enabled: bool) -> PostAgentConfig {
    PostAgentConfig {
        dry_run,
        compose: ComposeConfig {
            target_chars: config.llm.target_chars,
            max_chars: config.llm.max_chars,
            hashtags: config.llm.hashtags,
            ..Default::default()
        },
        illustrate: IllustrateConfig {
            enabled: image_enabled,
            subject_prefix: config.image.subject_prefix.clone(),
            styles: config.image.styles.clone(),
            suffix: config.image.suffix.clone(),
            file_stem: config.image.file_stem.clone(),
        },
    }
}

/// Secrets needed by the configured providers
pub(crate) struct Credentials {
    pub llm: Option<SecretString>,
    pub image: Option<SecretString>,
    pub publisher: Option<SecretString>,
}

impl Credentials {
    pub(crate) fn resolve(
        config: &AppConfig,
        image_enabled: bool,
        publishing: bool,
    ) -> Result<Self> {
        let llm = match config.llm.provider.as_str() {
            "openai_compat" => Some(load_api_key(&config.llm.api_key_env, "openai_compat")?),
            "stub" => None,
            other => bail!("Unknown LLM provider: {}", other),
        };

        let image = if !image_enabled {
            None
        } else {
            match config.image.provider.as_str() {
                "huggingface" => Some(load_api_key(&config.image.api_key_env, "huggingface")?),
                "stub" | "failing" => None,
                other => bail!("Unknown image provider: {}", other),
            }
        };

        let publisher = if !publishing {
            None
        } else {
            match config.publisher.provider.as_str() {
                "mastodon" => Some(load_api_key(
                    &config.publisher.access_token_env,
                    "mastodon",
                )?),
                "stub" => None,
                other => bail!("Unknown publisher provider: {}", other),
            }
        };

        Ok(Self {
            llm,
            image,
            publisher,
        })
    }
}

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

pub(crate) async fn build_post_log(config: &AppConfig) -> Result<Arc<dyn PostLog>> {
    match config.log.backend.as_str() {
        "csv" => Ok(Arc::new(CsvPostLog::new(config.log.path.clone()))),
        "sqlite" => {
            let log = SqlitePostLog::new(&config.log.sqlite_path)
                .await
                .context("Failed to open SQLite post log")?;
            Ok(Arc::new(log))
        }
        other => bail!("Unknown post log backend: {}", other),
    }
}

fn build_content_generator(
    config: &AppConfig,
    api_key: Option<SecretString>,
) -> Result<Arc<dyn ContentGenerator>> {
    match config.llm.provider.as_str() {
        "openai_compat" => {
            let base_url = config.llm.base_url.trim();
            if base_url.is_empty() {
                bail!("LLM base_url is required");
            }
            let api_key = api_key.context("LLM API key was not resolved")?;
            let generator = OpenAiCompatGenerator::new(
                api_key,
                base_url.to_string(),
                adapter_llm_config(config),
            )
            .context("Failed to build content generator")?;
            Ok(Arc::new(generator))
        }
        "stub" => Ok(Arc::new(StubContentGenerator::echo())),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

fn adapter_llm_config(config: &AppConfig) -> AdapterLlmConfig {
    AdapterLlmConfig {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_output_tokens: config.llm.max_output_tokens,
        timeout_secs: config.llm.timeout_secs,
        retries: config.llm.retries,
    }
}

fn build_image_generator(
    config: &AppConfig,
    enabled: bool,
    token: Option<SecretString>,
) -> Result<Arc<dyn ImageGenerator>> {
    // Never called when illustration is off
    if !enabled {
        return Ok(Arc::new(StubImageGenerator::placeholder()));
    }

    match config.image.provider.as_str() {
        "huggingface" => {
            let token = token.context("Image API token was not resolved")?;
            let generator = HuggingFaceImageGenerator::with_base_url(
                token,
                config.image.base_url.clone(),
                HuggingFaceConfig {
                    model: config.image.model.clone(),
                    timeout_secs: config.image.timeout_secs,
                },
            )
            .context("Failed to build image generator")?;
            Ok(Arc::new(generator))
        }
        "stub" => Ok(Arc::new(StubImageGenerator::placeholder())),
        "failing" => Ok(Arc::new(StubImageGenerator::failing(
            "image provider configured to fail",
        ))),
        other => bail!("Unknown image provider: {}", other),
    }
}

fn build_publisher(
    config: &AppConfig,
    dry_run: bool,
    token: Option<SecretString>,
) -> Result<Arc<dyn Publisher>> {
    if dry_run {
        return Ok(Arc::new(StubPublisher::new(false)));
    }

    match config.publisher.provider.as_str() {
        "mastodon" => {
            let token = token.context("Mastodon access token was not resolved")?;
            let visibility: Visibility = config
                .publisher
                .visibility
                .parse()
                .map_err(anyhow::Error::msg)?;
            let publisher = MastodonPublisher::new(
                token,
                config.publisher.base_url.clone(),
                MastodonConfig {
                    visibility,
                    max_chars: config.publisher.max_chars,
                    timeout_secs: config.publisher.timeout_secs,
                    ..Default::default()
                },
            )
            .context("Failed to build Mastodon publisher")?;
            Ok(Arc::new(publisher))
        }
        "stub" => Ok(Arc::new(StubPublisher::new(true))),
        other => bail!("Unknown publisher provider: {}", other),
    }
}
