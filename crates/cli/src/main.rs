//! crate-digger CLI.
//!
//! Two independent pipelines behind one binary: `generate` fetches a
//! Discogs release and renders its promo clips into the output tree;
//! `list` and `publish` pick complete folders up later and post them.
//! `account` and `config` are one-time operator helpers.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digger_core::{load_config, validate_config};

/// Discogs release promo clip generator and Instagram publisher
#[derive(Parser)]
#[command(name = "digger", author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (default: config.toml, optional;
    /// everything can come from DIGGER_* environment variables)
    #[arg(short, long, env = "DIGGER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a Discogs release and generate its promo clips
    Generate {
        /// Release id or Discogs release/master URL
        release: String,
        /// Only write the metadata text file, skip video generation
        #[arg(long)]
        txt_only: bool,
    },
    /// List output folders eligible for publishing
    List,
    /// Publish an eligible folder to Instagram
    Publish {
        /// Folder name under the output root
        name: Option<String>,
        /// Publish every eligible folder
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },
    /// Look up the Instagram business accounts behind the token
    Account,
    /// Show the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // An explicitly given config file must exist; the default one is
    // optional since every value can come from the environment.
    let (config_path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from("config.toml"), false),
    };
    let config = load_config(&config_path, required)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    match cli.command {
        Commands::Generate { release, txt_only } => {
            commands::cmd_generate(&config, &release, txt_only).await
        }
        Commands::List => commands::cmd_list(&config).await,
        Commands::Publish { name, all } => commands::cmd_publish(&config, name, all).await,
        Commands::Account => commands::cmd_account(&config).await,
        Commands::Config => commands::cmd_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from(["digger", "generate", "1234567", "--txt-only"]);
        match cli.command {
            Commands::Generate { release, txt_only } => {
                assert_eq!(release, "1234567");
                assert!(txt_only);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_publish_all_conflicts_with_name() {
        assert!(Cli::try_parse_from(["digger", "publish", "Folder", "--all"]).is_err());
        assert!(Cli::try_parse_from(["digger", "publish", "--all"]).is_ok());
    }
}
