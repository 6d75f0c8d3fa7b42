//! Tribe — gene set version editor.
//! Entry point for the `tribe` binary.

mod config;
mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tribe_common::PriorVersion;
use tribe_versions::ForkDraft;

/// Command-line arguments for tribe
#[derive(Parser, Debug)]
#[command(name = "tribe")]
#[command(about = "Replay gene set editing sessions and build version payloads")]
#[command(version)]
struct Cli {
    /// Path to tribe.toml
    #[arg(short, long, env = "TRIBE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay an edit script and print the new version payload
    Replay {
        /// Prior version JSON; omit to build a first version
        #[arg(long)]
        prior: Option<PathBuf>,

        /// Edit script JSON (array of commands)
        #[arg(long)]
        edits: PathBuf,

        /// Gene search response JSON to fold in before the edits
        #[arg(long)]
        search: Option<PathBuf>,

        /// Gene set resource URI (first version only)
        #[arg(long)]
        geneset: Option<String>,

        /// Version description
        #[arg(long)]
        description: Option<String>,

        /// Print the full report (changes, pending queries) instead of the payload
        #[arg(long)]
        report: bool,
    },
    /// Print the gene set payload that forks a prior version
    Fork {
        /// Version JSON to fork from
        #[arg(long)]
        prior: PathBuf,

        /// Override the generated title
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the effective configuration
    ShowConfig,
}

/// Fork payload for `version`, with an optional title override.
fn fork_draft(version: &PriorVersion, title: Option<String>) -> Result<ForkDraft> {
    let mut fork = ForkDraft::from_version(version);
    if let Some(title) = title {
        fork.title = title;
    }
    fork.validate()?;
    Ok(fork)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = config::Config::load(cli.config.as_deref());

    // Logs go to stderr; stdout carries the JSON output.
    let fallback_filter = loaded
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| config::LoggingConfig::default().filter);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(fallback_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Tribe editor {}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(c) => {
            info!(
                "Configuration loaded. Dedupe publications: {}, event capacity: {}",
                c.session.dedupe_publications, c.session.event_capacity
            );
            c
        }
        Err(e) => {
            warn!("Could not load configuration: {e}");
            warn!("Using defaults.");
            config::Config::default()
        }
    };

    match cli.command {
        Command::ShowConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Command::Replay { prior, edits, search, geneset, description, report } => {
            let args = replay::ReplayArgs { prior, edits, search, geneset, description };
            let outcome = replay::run(&config, &args)
                .await
                .context("Replay failed")?;
            let json = if report {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string_pretty(&outcome.version)?
            };
            println!("{json}");
        }
        Command::Fork { prior, title } => {
            let version: PriorVersion = replay::read_json(&prior, "prior version").await?;
            let fork = fork_draft(&version, title)?;
            info!("Forking {} at {}", fork.fork_of, fork.fork_version);
            println!("{}", serde_json::to_string_pretty(&fork)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribe_test_utils::prior_version;

    #[test]
    fn test_fork_title_override() {
        let version = prior_version("DNA repair", "0123456789abcdef", Vec::new());

        let fork = fork_draft(&version, None).unwrap();
        assert_eq!(fork.title, "Fork of DNA repair at version 0123456789ab");

        let fork = fork_draft(&version, Some("My DNA repair".to_string())).unwrap();
        assert_eq!(fork.title, "My DNA repair");
        assert_eq!(fork.fork_version, "0123456789abcdef");
    }

    #[test]
    fn test_blank_title_override_is_rejected() {
        let version = prior_version("DNA repair", "0123456789abcdef", Vec::new());
        let err = fork_draft(&version, Some("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains("title"));
    }
}
