//! Configuration loading for the Tribe editor.
//! Reads tribe.toml from the current directory or the path in TRIBE_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tribe_annotations::TrackerPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "bool_true")]
    pub dedupe_publications: bool,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn bool_true()              -> bool  { true }
fn default_event_capacity() -> usize { 64 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dedupe_publications: bool_true(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl SessionConfig {
    pub fn policy(&self) -> TrackerPolicy {
        TrackerPolicy { dedupe_publications: self.dedupe_publications }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_results_per_page")]
    pub results_per_page: usize,
    #[serde(default = "default_genes_per_page")]
    pub genes_per_page: usize,
}

fn default_results_per_page() -> usize { tribe_search::DEFAULT_RESULTS_PER_PAGE }
fn default_genes_per_page()   -> usize { tribe_search::DEFAULT_GENES_PER_PAGE }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_per_page: default_results_per_page(),
            genes_per_page: default_genes_per_page(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; RUST_LOG wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "tribe=debug,info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

mod tests;

impl Config {
    /// Load configuration from `path`, or from TRIBE_CONFIG / tribe.toml.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("TRIBE_CONFIG")
                .unwrap_or_else(|_| "tribe.toml".to_string())
                .into(),
        };

        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.search.results_per_page == 0 || self.search.genes_per_page == 0 {
            anyhow::bail!("search page sizes must be at least 1");
        }
        if self.session.event_capacity == 0 {
            anyhow::bail!("session.event_capacity must be at least 1");
        }
        Ok(())
    }
}
