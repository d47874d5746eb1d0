//! Print the fully expanded wikitext of one document.
//!
//! Useful for debugging template libraries: comments are removed and every
//! template invocation is expanded, but no other cleaning is applied.
//!
//! ```bash
//! wikiextract expand Paris.wiki --templates ./templates
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{load_store, read_document};
use crate::config::ExtractorConfig;
use crate::extractor::Extractor;

/// Command to expand the templates of a single document.
#[derive(Args, Debug)]
pub struct ExpandCommand {
    /// Wikitext file
    input: PathBuf,

    /// Directory of template files
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Document title used by page-name magic words (defaults to the file name)
    #[arg(long)]
    title: Option<String>,
}

impl ExpandCommand {
    /// Execute the expand command.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = ExtractorConfig::load_with_optional(config_path).await?;
        let extractor = Extractor::new(&config)?;
        let store = load_store(self.templates.as_deref(), &extractor.settings().titles).await?;
        let document = read_document(&self.input, "1".to_string(), self.title, &config).await?;

        let (result, stats) = extractor.expand(&store, &document);
        tracing::debug!("Expansion stats for '{}': {:?}", document.title, stats);
        match result {
            Ok(text) => println!("{text}"),
            Err(discard) => {
                eprintln!(
                    "{} '{}' was discarded while expanding '{}'",
                    "Document".yellow(),
                    document.title,
                    discard.template
                );
            }
        }
        Ok(())
    }
}
