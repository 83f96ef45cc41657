//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// topic-poster: publish one post per run about the next topic in rotation
#[derive(Parser, Debug)]
#[command(name = "topic-poster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select the next topic, generate a post, and publish it
    Run(RunArgs),

    /// Show the rotation state and the next topic
    Status(StatusArgs),

    /// Inspect the topic source
    Topics(TopicsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Generate the post without recording the topic or publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip image generation and post text only
    #[arg(long)]
    pub no_image: bool,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TopicsArgs {
    #[command(subcommand)]
    pub command: TopicsCommands,
}

#[derive(Subcommand, Debug)]
pub enum TopicsCommands {
    /// List all topics with their indices
    List {
        /// Override the topics CSV path
        #[arg(long)]
        topics_path: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the topics file
    Validate {
        /// Override the topics CSV path
        #[arg(long)]
        topics_path: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
