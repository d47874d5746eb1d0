//! Template sources and title qualification.
//!
//! The expansion core only needs two questions answered: "what is the body of
//! this fully qualified title?" and "does this title redirect elsewhere?". The
//! [`TemplateStore`] trait captures exactly that. [`InMemoryTemplateStore`] is
//! the implementation used by the CLI, filled from a directory of template
//! files, one file per template.
//!
//! # Directory layout
//!
//! ```text
//! templates/
//! ├── Convert.wiki             -> Template:Convert
//! ├── Infobox_person.wiki      -> Template:Infobox person
//! └── Module/Utility.wiki      -> Template:Utility
//! ```
//!
//! A body starting with `#REDIRECT [[Target]]` registers a redirect instead
//! of a template.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use crate::constants::DEFAULT_TEMPLATE_NAMESPACE;
use crate::core::WikiError;
use crate::scanner::drop_nested;
use crate::templating::functions::ucfirst;

static REDIRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#redirect\s*:?\s*\[\[([^\]|#]+)").unwrap());
static NOINCLUDE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<noinclude\s*>").unwrap());
static NOINCLUDE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</noinclude\s*>").unwrap());
static INCLUDEONLY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?includeonly\s*>").unwrap());
static ONLYINCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<onlyinclude>(.*?)</onlyinclude>").unwrap());

/// Source of raw template bodies, shared read-only between workers.
pub trait TemplateStore: Send + Sync {
    /// Raw body of the fully qualified `title`. A miss is not an error.
    fn lookup(&self, title: &str) -> Option<&str>;

    /// Target of a redirect registered for `title`.
    fn redirect(&self, _title: &str) -> Option<&str> {
        None
    }
}

/// Turns the title of an invocation into the key a store uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleResolver {
    known_namespaces: BTreeSet<String>,
    template_namespace: String,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(
            BTreeSet::from([DEFAULT_TEMPLATE_NAMESPACE.to_string()]),
            DEFAULT_TEMPLATE_NAMESPACE,
        )
    }
}

impl TitleResolver {
    pub fn new(known_namespaces: BTreeSet<String>, template_namespace: &str) -> Self {
        Self {
            known_namespaces: known_namespaces.iter().map(|ns| ucfirst(ns.trim())).collect(),
            template_namespace: ucfirst(template_namespace.trim()),
        }
    }

    /// Whether `prefix` names a known namespace (first letter case-insensitive).
    #[must_use]
    pub fn is_namespace(&self, prefix: &str) -> bool {
        self.known_namespaces.contains(&ucfirst(prefix.trim()))
    }

    /// Fully qualify `title`.
    ///
    /// - `:Page` refers to a page outside any namespace.
    /// - `Ns:Page` with a known namespace keeps it.
    /// - anything else lands in the template namespace.
    ///
    /// Underscores count as spaces. An empty title stays empty.
    #[must_use]
    pub fn qualify(&self, title: &str) -> String {
        let title = title.replace('_', " ");
        let title = title.trim();
        if title.is_empty() {
            return String::new();
        }
        if let Some(rest) = title.strip_prefix(':') {
            return ucfirst(rest.trim());
        }
        if let Some((prefix, rest)) = title.split_once(':') {
            if self.is_namespace(prefix) {
                let rest = rest.trim();
                if rest.is_empty() {
                    return String::new();
                }
                return format!("{}:{}", ucfirst(prefix.trim()), ucfirst(rest));
            }
        }
        format!("{}:{}", self.template_namespace, ucfirst(title))
    }
}

/// Apply inclusion control to a raw body before it is parsed.
///
/// `<noinclude>` sections disappear, `<includeonly>` tags are unwrapped, and
/// when `<onlyinclude>` blocks exist only their contents survive.
#[must_use]
pub fn transclusion_body(raw: &str) -> String {
    let only: Vec<&str> = ONLYINCLUDE
        .captures_iter(raw)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let body = if only.is_empty() { raw.to_string() } else { only.concat() };
    let body = drop_nested(&body, &NOINCLUDE_OPEN, &NOINCLUDE_CLOSE);
    INCLUDEONLY_TAG.replace_all(&body, "").into_owned()
}

/// Templates and redirects held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    titles: TitleResolver,
    templates: HashMap<String, String>,
    redirects: HashMap<String, String>,
}

impl InMemoryTemplateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_titles(titles: TitleResolver) -> Self {
        Self {
            titles,
            ..Self::default()
        }
    }

    /// Register `body` under `title`, or a redirect when the body is one.
    pub fn insert(&mut self, title: &str, body: impl Into<String>) {
        let body = body.into();
        let key = self.titles.qualify(title);
        if key.is_empty() {
            tracing::warn!("Ignoring template with empty title");
            return;
        }
        if let Some(caps) = REDIRECT.captures(&body) {
            let target = self.titles.qualify(&caps[1]);
            tracing::debug!("Redirect {key} -> {target}");
            self.redirects.insert(key, target);
        } else {
            self.templates.insert(key, body);
        }
    }

    pub fn insert_redirect(&mut self, from: &str, to: &str) {
        self.redirects.insert(self.titles.qualify(from), self.titles.qualify(to));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.redirects.len()
    }

    /// Load every regular file under `dir`; the file stem is the title.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(WikiError::TemplateStoreError {
                path: dir.display().to_string(),
                reason: "not a directory".to_string(),
            }
            .into());
        }

        let mut loaded = 0;
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry =
                entry.with_context(|| format!("Failed to walk template directory {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            self.insert(stem, body);
            loaded += 1;
        }

        tracing::debug!(
            "Loaded {loaded} template files from {} ({} redirects)",
            dir.display(),
            self.redirects.len()
        );
        Ok(loaded)
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn lookup(&self, title: &str) -> Option<&str> {
        self.templates.get(title).map(String::as_str)
    }

    fn redirect(&self, title: &str) -> Option<&str> {
        self.redirects.get(title).map(String::as_str)
    }
}
