//! Extract plain text from wikitext documents.
//!
//! Every input file is one document. Documents are extracted in parallel on
//! the blocking thread pool, bounded by `--max-parallel`; each worker builds
//! its own expander, so only the template store and the compiled settings are
//! shared. Output is written in input order.
//!
//! # Examples
//!
//! ```bash
//! wikiextract extract Paris.wiki --templates ./templates
//! wikiextract extract pages/*.wiki --format json --output out.jsonl
//! wikiextract extract Paris.wiki --markdown --keep-links
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use futures::future::join_all;
use tokio::sync::Semaphore;

use super::common::{default_url_base, load_store, read_document};
use crate::config::ExtractorConfig;
use crate::constants::DEFAULT_MAX_PARALLEL;
use crate::core::WikiError;
use crate::extractor::{Document, Extraction, Extractor, OutputFormat, render};
use crate::templating::ExpansionStats;

/// Command to extract clean text from wikitext files.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Wikitext files, one document each
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory of template files
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Document title (single input only; defaults to the file name)
    #[arg(long)]
    title: Option<String>,

    /// Id of the first document; later inputs count up from it
    #[arg(long, default_value_t = 1)]
    id: u64,

    /// URL base for document links (defaults to the configured server)
    #[arg(long)]
    url_base: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix section headers with `#` per level
    #[arg(long)]
    markdown: bool,

    /// Emit HTML headers, lists and inline formatting
    #[arg(long)]
    html: bool,

    /// Do not escape `<`, `>` and `&` in the output
    #[arg(long)]
    no_html_safe: bool,

    /// Remove templates instead of expanding them
    #[arg(long)]
    no_expand: bool,

    /// Render links as `<a href>` anchors
    #[arg(long)]
    keep_links: bool,

    /// Maximum number of documents extracted at once
    #[arg(long, default_value_t = DEFAULT_MAX_PARALLEL)]
    max_parallel: usize,
}

/// Totals over one run.
#[derive(Debug, Default)]
struct RunSummary {
    extracted: usize,
    discarded: usize,
    stats: ExpansionStats,
}

impl RunSummary {
    fn record(&mut self, extraction: &Extraction) {
        if extraction.is_discarded() {
            self.discarded += 1;
        } else {
            self.extracted += 1;
        }
        let stats = &extraction.stats;
        self.stats.template_depth_exceeded += stats.template_depth_exceeded;
        self.stats.invocation_depth_exceeded += stats.invocation_depth_exceeded;
        self.stats.parameter_depth_exceeded += stats.parameter_depth_exceeded;
        self.stats.title_errors += stats.title_errors;
        self.stats.invocations += stats.invocations;
        self.stats.expansion_budget_exceeded |= stats.expansion_budget_exceeded;
        self.stats.cache_hits += stats.cache_hits;
        self.stats.cache_misses += stats.cache_misses;
    }
}

impl ExtractCommand {
    fn apply_overrides(&self, config: &mut ExtractorConfig) {
        if self.markdown {
            config.output.markdown_headers = true;
        }
        if self.html {
            config.output.html_formatting = true;
        }
        if self.no_html_safe {
            config.output.html_safe = false;
        }
        if self.no_expand {
            config.output.expand_templates = false;
        }
        if self.keep_links {
            config.output.keep_links = true;
        }
    }

    async fn read_documents(&self, config: &ExtractorConfig) -> Result<Vec<Document>> {
        if self.title.is_some() && self.inputs.len() > 1 {
            bail!("--title can only be used with a single input file");
        }
        let url_base = self.url_base.clone().unwrap_or_else(|| default_url_base(config));

        let mut documents = Vec::with_capacity(self.inputs.len());
        for (offset, path) in (0u64..).zip(&self.inputs) {
            let id = (self.id + offset).to_string();
            let document = read_document(path, id, self.title.clone(), config).await?;
            documents.push(document.with_url_base(&url_base));
        }
        Ok(documents)
    }

    /// Execute the extract command.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let mut config = ExtractorConfig::load_with_optional(config_path).await?;
        self.apply_overrides(&mut config);
        config.validate()?;

        let extractor = Arc::new(Extractor::new(&config)?);
        let store = Arc::new(load_store(self.templates.as_deref(), &extractor.settings().titles).await?);
        let documents = self.read_documents(&config).await?;
        tracing::info!("Extracting {} documents", documents.len());

        let semaphore = Arc::new(Semaphore::new(self.max_parallel.max(1)));
        let tasks = documents.into_iter().map(|document| {
            let extractor = Arc::clone(&extractor);
            let store = Arc::clone(&store);
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire_owned().await.context("Worker pool closed")?;
                tokio::task::spawn_blocking(move || {
                    let extraction = extractor.extract(store.as_ref(), &document);
                    (document, extraction)
                })
                .await
                .map_err(|e| anyhow!("Extraction task failed: {e}"))
            }
        });
        let results = join_all(tasks).await;

        let mut summary = RunSummary::default();
        let mut rendered = String::new();
        for result in results {
            let (document, extraction) = result?;
            summary.record(&extraction);
            if let Some(blocks) = extraction.blocks() {
                rendered.push_str(&render(self.format, &document, blocks)?);
            }
        }

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &rendered).await.map_err(|e| WikiError::OutputError {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
            None => print!("{rendered}"),
        }

        tracing::info!(
            "Extracted {} documents, discarded {}",
            summary.extracted,
            summary.discarded
        );
        if summary.stats.has_errors() {
            tracing::warn!(
                "Recursion ceilings hit: {} template, {} invocation, {} parameter; {} bad titles{}",
                summary.stats.template_depth_exceeded,
                summary.stats.invocation_depth_exceeded,
                summary.stats.parameter_depth_exceeded,
                summary.stats.title_errors,
                if summary.stats.expansion_budget_exceeded {
                    "; expansion budget spent"
                } else {
                    ""
                }
            );
        }
        tracing::debug!(
            "{} invocations; template cache: {} hits, {} misses",
            summary.stats.invocations,
            summary.stats.cache_hits,
            summary.stats.cache_misses
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        command: ExtractCommand,
    }

    fn parse(args: &[&str]) -> ExtractCommand {
        let mut argv = vec!["extract"];
        argv.extend_from_slice(args);
        Wrapper::parse_from(argv).command
    }

    #[test]
    fn test_defaults() {
        let cmd = parse(&["a.wiki"]);
        assert_eq!(cmd.format, OutputFormat::Text);
        assert_eq!(cmd.id, 1);
        assert_eq!(cmd.max_parallel, DEFAULT_MAX_PARALLEL);
        assert!(!cmd.no_expand);
    }

    #[test]
    fn test_overrides() {
        let cmd = parse(&["a.wiki", "--markdown", "--html", "--no-html-safe", "--no-expand", "--keep-links"]);
        let mut config = ExtractorConfig::default();
        cmd.apply_overrides(&mut config);
        assert!(config.output.markdown_headers);
        assert!(config.output.html_formatting);
        assert!(!config.output.html_safe);
        assert!(!config.output.expand_templates);
        assert!(config.output.keep_links);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        let extracted = Extraction {
            outcome: crate::extractor::Outcome::Extracted(vec![]),
            stats: ExpansionStats {
                cache_hits: 2,
                ..ExpansionStats::default()
            },
        };
        let discarded = Extraction {
            outcome: crate::extractor::Outcome::Discarded(crate::core::Discard::template("X")),
            stats: ExpansionStats::default(),
        };
        summary.record(&extracted);
        summary.record(&discarded);
        assert_eq!(summary.extracted, 1);
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.stats.cache_hits, 2);
    }

    #[tokio::test]
    async fn test_title_requires_single_input() {
        let cmd = parse(&["a.wiki", "b.wiki", "--title", "T"]);
        assert!(cmd.read_documents(&ExtractorConfig::default()).await.is_err());
    }
}
