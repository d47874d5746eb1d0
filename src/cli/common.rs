//! Helpers shared by the `extract` and `expand` commands.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ExtractorConfig;
use crate::core::WikiError;
use crate::extractor::Document;
use crate::templating::{InMemoryTemplateStore, TitleResolver};

/// Load the template directory, or return an empty store when none is given.
pub async fn load_store(dir: Option<&Path>, titles: &TitleResolver) -> Result<InMemoryTemplateStore> {
    let mut store = InMemoryTemplateStore::with_titles(titles.clone());
    let Some(dir) = dir else {
        tracing::debug!("No template directory given, templates will expand to nothing");
        return Ok(store);
    };

    let dir = dir.to_path_buf();
    let store = tokio::task::spawn_blocking(move || -> Result<InMemoryTemplateStore> {
        let loaded = store.load_dir(&dir)?;
        tracing::info!("Loaded {loaded} templates from {}", dir.display());
        Ok(store)
    })
    .await
    .context("Template loading task failed")??;
    Ok(store)
}

/// Read one input file as a document.
///
/// The title defaults to the file stem with underscores turned into spaces.
pub async fn read_document(
    path: &Path,
    id: String,
    title: Option<String>,
    config: &ExtractorConfig,
) -> Result<Document> {
    if !path.exists() {
        return Err(WikiError::InputNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input {}", path.display()))?;
    let title = title.unwrap_or_else(|| title_from_path(path));
    Ok(Document::new(id, title, text).with_language(config.language.clone()))
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// URL base derived from the configured server, e.g. `https://en.wikipedia.org/wiki`.
pub fn default_url_base(config: &ExtractorConfig) -> String {
    let server = config.site.server.trim_end_matches('/');
    if server.starts_with("//") {
        format!("https:{server}/wiki")
    } else {
        format!("{server}/wiki")
    }
}
