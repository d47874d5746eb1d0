//! Show or create the extraction configuration file.
//!
//! ```bash
//! wikiextract config show          # effective configuration as TOML
//! wikiextract config               # same as show
//! wikiextract config init          # write defaults to the default path
//! wikiextract --config ./wx.toml config init --force
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::ExtractorConfig;

/// Command to manage the configuration file.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Print the effective configuration (the default)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    /// Execute the config command against `config_path` or the default location.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
        }
    }

    fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path),
            None => ExtractorConfig::default_path(),
        }
    }

    async fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let path = Self::resolve_path(config_path)?;
        if path.exists() && !force {
            println!("{} Config already exists at: {}", "!".yellow(), path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        ExtractorConfig::default().save_to(&path).await?;
        println!("{} Created config at: {}", "✓".green(), path.display());
        Ok(())
    }

    async fn show(config_path: Option<PathBuf>) -> Result<()> {
        let config = ExtractorConfig::load_with_optional(config_path.clone()).await?;
        let location = Self::resolve_path(config_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "<none>".to_string());

        println!("{}", "# wikiextract configuration".bold());
        println!("# Location: {location}\n");
        println!("{}", config.to_toml()?);
        Ok(())
    }
}
