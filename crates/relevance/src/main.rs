//! Relevance CLI - scores GitHub comments against the images and pages they reference.
//!
//! # Usage
//!
//! ```bash
//! # Score a comment with one image and one link
//! relevance score "Fixed the sidebar overlap" \
//!     --image https://example.com/shot.png --link https://example.com/issue --llm ollama
//!
//! # Score a markdown body, discovering attachments in it
//! relevance score --markdown "$(cat comment.md)"
//!
//! # Annotate a GitHub comment (reads GITHUB_TOKEN, GITHUB_REPOSITORY, ISSUE_NUMBER, COMMENT_ID)
//! relevance annotate --llm openai
//!
//! # Manage the embedding model
//! relevance models download
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use relevance_core::Config;

mod cli;
mod logging;

/// Relevance - scores how well a comment matches its attached images and links.
#[derive(Parser, Debug)]
#[command(name = "relevance")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "RELEVANCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Score comment text against image and link attachments
    Score(cli::score::ScoreArgs),

    /// Score a GitHub issue comment and write the score into its body
    Annotate(cli::annotate::AnnotateArgs),

    /// Manage the sentence embedding model (download, list, path)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config_path = cli
        .config
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(Config::default_path);
    let config = match load_config(cli.config.is_some(), &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config from {}: {e}\n  \
                 Using default configuration. Check your config file with `relevance config path`.",
                config_path.display()
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Relevance v{}", relevance_core::VERSION);

    match cli.command {
        Commands::Score(args) => cli::score::execute(args, config).await,
        Commands::Annotate(args) => cli::annotate::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, config_path).await,
    }
}

/// An explicit `--config` must exist; the default location may be absent.
fn load_config(explicit: bool, path: &Path) -> Result<Config, relevance_core::ConfigError> {
    if explicit {
        Config::load_from(path)
    } else {
        Config::load()
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
