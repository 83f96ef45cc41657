//! Status command - show rotation state without changing it

use anyhow::{Context, Result};
use std::path::PathBuf;
use topic_poster_adapters::topics::open_topic_repo;
use topic_poster_domain::{PostLog, TopicRepo, select_next_topic};

use crate::args::StatusArgs;
use crate::commands::run::build_post_log;
use crate::config::AppConfig;

pub async fn execute(args: StatusArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let topics = open_topic_repo(&config.general.topics_path)
        .context("Failed to open topic source")?
        .load()
        .await
        .context("Failed to load topics")?;

    let post_log = build_post_log(&config).await?;
    let records = post_log.load().await.context("Failed to load post log")?;
    let (next, _) = select_next_topic(&topics, &records).context("Cannot compute rotation")?;

    let last = records.last().map(|record| {
        let text = topics
            .get(record.topic_index)
            .map(|t| t.text.clone())
            .unwrap_or_else(|| "<no longer in topic source>".to_string());
        (record.topic_index, text)
    });

    if args.json {
        let output = serde_json::json!({
            "posted_count": records.len(),
            "topic_count": topics.len(),
            "cycle_number": next.cycle_number,
            "position_in_cycle": next.position_in_cycle,
            "next_topic": next.topic,
            "last_topic": last.as_ref().map(|(index, text)| serde_json::json!({
                "index": index,
                "text": text,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Rotation Status");
        println!("===============");
        println!();
        println!("Posted so far: {}", records.len());
        println!("Topics:        {}", topics.len());
        println!(
            "Cycle:         {} (next is {}/{})",
            next.cycle_number, next.position_in_cycle, next.total_topics
        );
        if let Some((index, text)) = last {
            println!("Last topic:    [{}] {}", index, text);
        }
        println!("Next topic:    [{}] {}", next.topic.index, next.topic.text);
    }

    Ok(())
}
