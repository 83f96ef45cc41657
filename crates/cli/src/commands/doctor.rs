//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use topic_poster_adapters::{
    post_log::{CsvPostLog, SqlitePostLog},
    topics::open_topic_repo,
};
use topic_poster_domain::{PostLog, TopicRepo};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    topics: CheckResult,
    post_log: CheckResult,
    llm: CheckResult,
    image: CheckResult,
    publisher: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        topics: CheckResult::error("Not checked"),
        post_log: CheckResult::error("Not checked"),
        llm: CheckResult::error("Not checked"),
        image: CheckResult::error("Not checked"),
        publisher: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.topics = check_topics(&config.general.topics_path).await;
        report.post_log = check_post_log(config).await;
        report.llm = check_llm(config);
        report.image = check_image(config);
        report.publisher = check_publisher(config);
    }

    let checks = [
        &report.config,
        &report.topics,
        &report.post_log,
        &report.llm,
        &report.image,
        &report.publisher,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_topics(path: &Path) -> CheckResult {
    let repo = match open_topic_repo(path) {
        Ok(r) => r,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    match repo.validate().await {
        Ok(()) => match repo.load().await {
            Ok(topics) => CheckResult::ok(format!("{} topics loaded", topics.len()))
                .with_details(serde_json::json!({
                    "path": path.display().to_string(),
                    "count": topics.len(),
                })),
            Err(e) => CheckResult::error(format!("Failed to load topics: {}", e)),
        },
        Err(e) => CheckResult::error(format!("Validation failed: {}", e)),
    }
}

async fn check_post_log(config: &AppConfig) -> CheckResult {
    match config.log.backend.as_str() {
        "csv" => {
            let path = &config.log.path;
            if !path.exists() {
                return CheckResult::ok(format!(
                    "CSV log {} not created yet (rotation starts at the first topic)",
                    path.display()
                ));
            }
            describe_log(&CsvPostLog::new(path.clone()), "CSV", path).await
        }
        "sqlite" => {
            let path = &config.log.sqlite_path;
            // Opening creates the database, so only inspect an existing one
            if !path.exists() {
                return CheckResult::ok(format!(
                    "SQLite log {} not created yet (rotation starts at the first topic)",
                    path.display()
                ));
            }
            match SqlitePostLog::new(path).await {
                Ok(log) => describe_log(&log, "SQLite", path).await,
                Err(e) => CheckResult::error(format!("Failed to open SQLite log: {}", e)),
            }
        }
        other => CheckResult::error(format!("Unknown post log backend: {}", other)),
    }
}

async fn describe_log(log: &dyn PostLog, kind: &str, path: &Path) -> CheckResult {
    match log.load().await {
        Ok(records) => CheckResult::ok(format!(
            "{} log {}: {} posts recorded",
            kind,
            path.display(),
            records.len()
        ))
        .with_details(serde_json::json!({ "posted_count": records.len() })),
        Err(e) => CheckResult::error(format!("Failed to read {} log: {}", kind, e)),
    }
}

fn check_secret(env_var: &str, summary: String) -> CheckResult {
    if env_var.trim().is_empty() {
        return CheckResult::error(format!("{}, no token env var configured", summary));
    }

    // Report presence only, never the value
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => {
            CheckResult::ok(format!("{}, token: {} (set)", summary, env_var))
        }
        _ => CheckResult::warn(format!("{}, token: {} (not set)", summary, env_var)),
    }
}

fn check_llm(config: &AppConfig) -> CheckResult {
    let llm = &config.llm;
    match llm.provider.as_str() {
        "stub" => CheckResult::ok("Provider: stub (offline)"),
        "openai_compat" => {
            if llm.base_url.trim().is_empty() {
                return CheckResult::error("LLM base_url is empty");
            }
            check_secret(
                &llm.api_key_env,
                format!(
                    "Provider: openai_compat, Model: {}, base_url: {}",
                    llm.model, llm.base_url
                ),
            )
        }
        other => CheckResult::error(format!("Unknown LLM provider: {}", other)),
    }
}

fn check_image(config: &AppConfig) -> CheckResult {
    let image = &config.image;
    if !image.enabled {
        return CheckResult::ok("Image generation disabled");
    }

    if image.styles.is_empty() {
        return CheckResult::error("Image generation enabled but no styles configured");
    }

    match image.provider.as_str() {
        "stub" => CheckResult::ok("Provider: stub (placeholder image)"),
        "failing" => CheckResult::warn("Provider: failing (every post goes out text-only)"),
        "huggingface" => check_secret(
            &image.api_key_env,
            format!("Provider: huggingface, Model: {}", image.model),
        ),
        other => CheckResult::error(format!("Unknown image provider: {}", other)),
    }
}

fn check_publisher(config: &AppConfig) -> CheckResult {
    let publisher = &config.publisher;

    if let Err(e) = publisher
        .visibility
        .parse::<topic_poster_adapters::mastodon::Visibility>()
    {
        return CheckResult::error(e);
    }

    let dry_run_note = if config.general.dry_run {
        " (dry run)"
    } else {
        ""
    };

    match publisher.provider.as_str() {
        "stub" => CheckResult::ok(format!("Provider: stub (offline){}", dry_run_note)),
        "mastodon" => check_secret(
            &publisher.access_token_env,
            format!(
                "Provider: mastodon, Instance: {}, Visibility: {}{}",
                publisher.base_url, publisher.visibility, dry_run_note
            ),
        ),
        other => CheckResult::error(format!("Unknown publisher provider: {}", other)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("topic-poster Doctor Report");
    println!("==========================");
    println!();

    print_check("Config", &report.config);
    print_check("Topics", &report.topics);
    print_check("Post Log", &report.post_log);
    print_check("LLM Provider", &report.llm);
    print_check("Image Provider", &report.image);
    print_check("Publisher", &report.publisher);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: topic-poster run --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
