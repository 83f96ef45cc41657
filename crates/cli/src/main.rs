//! topic-poster CLI entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_problem = dotenv_warning(dotenvy::dotenv());

    let cli = Cli::parse();

    // Initialize logging. Config errors surface again when the command loads it.
    let configured_level = AppConfig::load(cli.config.as_deref())
        .ok()
        .map(|config| config.general.log_level);
    let log_level = resolve_log_level(cli.log_level.as_deref(), configured_level.as_deref());
    init_logging(log_level)?;

    if let Some(problem) = dotenv_problem {
        tracing::warn!("{}", problem);
    }

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.config).await,
        Commands::Status(args) => commands::status::execute(args, cli.config).await,
        Commands::Topics(args) => commands::topics::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

/// A missing .env file is fine; anything else is worth a warning
fn dotenv_warning(result: Result<PathBuf, dotenvy::Error>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => Some(format!("Failed to load .env file: {}", e)),
    }
}

/// `--log-level` wins over `general.log_level`
fn resolve_log_level<'a>(flag: Option<&'a str>, configured: Option<&'a str>) -> &'a str {
    flag.or(configured)
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or("info")
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
