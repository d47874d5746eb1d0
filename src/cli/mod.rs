//! Command-line interface for wikiextract.
//!
//! # Available Commands
//!
//! - `extract` - extract clean text from one or more wikitext files
//! - `expand` - print the template-expanded wikitext of one file
//! - `config` - show or create the configuration file
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config` - path to a configuration file
//!
//! `RUST_LOG` takes effect when neither `--verbose` nor `--quiet` is given.
//!
//! # Example
//!
//! ```bash
//! wikiextract config init
//! wikiextract --verbose extract Paris.wiki --templates ./templates --format json
//! wikiextract expand Paris.wiki --templates ./templates
//! ```

mod common;
mod config;
mod expand;
mod extract;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so that tests and embedders can drive command
/// execution without touching process-wide state.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter forced by `--verbose` / `--quiet`.
    ///
    /// When `None`, `RUST_LOG` is used, falling back to `info`.
    pub log_level: Option<String>,

    /// Configuration file given with `--config`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the global subscriber is installed with.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Extract plain text from MediaWiki markup.
#[derive(Parser)]
#[command(
    name = "wikiextract",
    about = "Extract plain text from MediaWiki markup",
    version,
    author,
    long_about = "wikiextract expands templates, strips markup and formats the remaining text of MediaWiki documents."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract clean text from wikitext files
    Extract(extract::ExtractCommand),

    /// Print the template-expanded wikitext of one file
    Expand(expand::ExpandCommand),

    /// Show or create the configuration file
    Config(config::ConfigCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Extract(cmd) => cmd.execute(config.config_path).await,
            Commands::Expand(cmd) => cmd.execute(config.config_path).await,
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
