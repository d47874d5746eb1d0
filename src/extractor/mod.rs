//! Per-document extraction pipeline.
//!
//! ```text
//! raw wikitext
//!   -> comments removed, <math> rendered
//!   -> templates expanded (or removed when expansion is off)
//!   -> inline markup cleaned
//!   -> structural formatting
//!   -> output blocks
//! ```
//!
//! An [`Extractor`] holds only read-only settings and can be shared between
//! workers; every call to [`Extractor::extract`] creates its own
//! [`TemplateExpander`], so no expansion state crosses documents.

pub mod output;

use tracing::{debug, info};

use crate::cleaning::{self, CleanOptions};
use crate::config::ExtractorConfig;
use crate::core::{Discard, WikiError};
use crate::formatter::{FormatOptions, format_text};
use crate::templating::{ExpansionSettings, ExpansionStats, TemplateExpander, TemplateStore};

pub use output::{OutputFormat, render};

/// One input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Page URL; empty when unknown.
    pub url: String,
    pub language: Option<String>,
    pub text: String,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            language: None,
            text: text.into(),
        }
    }

    /// Set the URL to `<base>?curid=<id>`.
    #[must_use]
    pub fn with_url_base(mut self, base: &str) -> Self {
        self.url = format!("{base}?curid={}", self.id);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Extracted(Vec<String>),
    Discarded(Discard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub outcome: Outcome,
    pub stats: ExpansionStats,
}

impl Extraction {
    /// Output blocks, or `None` for a discarded document.
    #[must_use]
    pub fn blocks(&self) -> Option<&[String]> {
        match &self.outcome {
            Outcome::Extracted(blocks) => Some(blocks),
            Outcome::Discarded(_) => None,
        }
    }

    #[must_use]
    pub fn is_discarded(&self) -> bool {
        matches!(self.outcome, Outcome::Discarded(_))
    }
}

/// Read-only extraction pipeline.
#[derive(Debug, Clone)]
pub struct Extractor {
    settings: ExpansionSettings,
    clean: CleanOptions,
    format: FormatOptions,
    expand_templates: bool,
}

impl Extractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, WikiError> {
        Ok(Self {
            settings: ExpansionSettings::from_config(config)?,
            clean: CleanOptions::from_config(config),
            format: FormatOptions::from_config(config),
            expand_templates: config.output.expand_templates,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ExpansionSettings {
        &self.settings
    }

    /// Expand the templates of `document` and nothing else.
    pub fn expand(
        &self,
        store: &dyn TemplateStore,
        document: &Document,
    ) -> (Result<String, Discard>, ExpansionStats) {
        let mut expander = TemplateExpander::new(store, &self.settings, &document.title);
        let result = expander.expand_all(&Self::prepare(&document.text));
        (result, expander.stats())
    }

    /// Comments removed and formulas rendered, ready for expansion.
    fn prepare(text: &str) -> String {
        cleaning::clean_math(&cleaning::drop_comments(text))
    }

    /// Run the whole pipeline on `document`.
    pub fn extract(&self, store: &dyn TemplateStore, document: &Document) -> Extraction {
        let text = Self::prepare(&document.text);

        let (expanded, stats) = if self.expand_templates {
            let mut expander = TemplateExpander::new(store, &self.settings, &document.title);
            let expanded = expander.expand_all(&text);
            (expanded, expander.stats())
        } else {
            (Ok(cleaning::drop_templates(&text)), ExpansionStats::default())
        };

        let expanded = match expanded {
            Ok(text) => text,
            Err(discard) => {
                info!(
                    "Discarding document {} '{}': template '{}' ({:?})",
                    document.id, document.title, discard.template, discard.cause
                );
                return Extraction {
                    outcome: Outcome::Discarded(discard),
                    stats,
                };
            }
        };

        let cleaned = cleaning::clean_text(&expanded, &self.clean);
        let blocks = format_text(&cleaned, &self.format);
        debug!(
            "Document {} '{}': {} blocks, stats {:?}",
            document.id,
            document.title,
            blocks.len(),
            stats
        );

        Extraction {
            outcome: Outcome::Extracted(blocks),
            stats,
        }
    }
}
