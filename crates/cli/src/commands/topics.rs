//! Topics command - list and validate the topic source

use anyhow::{Context, Result};
use std::path::PathBuf;
use topic_poster_adapters::topics::open_topic_repo;
use topic_poster_domain::TopicRepo;

use crate::args::{TopicsArgs, TopicsCommands};
use crate::config::AppConfig;

pub async fn execute(args: TopicsArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        TopicsCommands::List { topics_path, json } => {
            list_topics(topics_path, json, config_path).await
        }
        TopicsCommands::Validate { topics_path } => {
            validate_topics(topics_path, config_path).await
        }
    }
}

fn resolve_path(topics_path: Option<PathBuf>, config_path: Option<PathBuf>) -> PathBuf {
    topics_path.unwrap_or_else(|| {
        AppConfig::load(config_path.as_deref())
            .unwrap_or_default()
            .general
            .topics_path
    })
}

async fn list_topics(
    topics_path: Option<PathBuf>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let path = resolve_path(topics_path, config_path);

    let repo = open_topic_repo(&path).context("Failed to open topic source")?;
    let topics = repo.load().await.context("Failed to load topics")?;

    if json {
        let output = serde_json::json!({
            "count": topics.len(),
            "topics": topics.iter().collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Topics ({} found)", topics.len());
        println!("================");
        println!();

        for topic in topics.iter() {
            println!("{:>4}  {}", topic.index, topic.text);
        }
    }

    Ok(())
}

async fn validate_topics(topics_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let path = resolve_path(topics_path, config_path);

    println!("Validating topics in: {}", path.display());

    let result = match open_topic_repo(&path) {
        Ok(repo) => match repo.validate().await {
            Ok(()) => repo.load().await.map(|topics| topics.len()),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(count) => {
            println!("✓ Validation passed ({} topics)", count);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Validation failed: {}", e);
            std::process::exit(1);
        }
    }
}
