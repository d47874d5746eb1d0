//! Extraction configuration.
//!
//! A single TOML file controls which templates are skipped or poison a
//! document, which sections are dropped, the recursion ceilings of the
//! expansion core and the shape of the output. Every field has a default, so
//! an empty file (or no file at all) is a valid configuration.
//!
//! # Location
//!
//! - `--config PATH` on the command line, or
//! - `<config dir>/wikiextract/config.toml` (`~/.config` on Linux,
//!   `~/Library/Application Support` on macOS, `%APPDATA%` on Windows)
//!
//! A missing file yields [`ExtractorConfig::default`]; a file that exists but
//! cannot be read or parsed is an error.
//!
//! # Example
//!
//! ```toml
//! language = "ca"
//! discard_templates = ["Delete", "Speedy"]
//! discard_sections = ["references", "see also"]
//!
//! [limits]
//! max_template_depth = 20
//!
//! [output]
//! markdown_headers = true
//! ```

use crate::constants::{
    DEFAULT_TEMPLATE_NAMESPACE, MAX_EXPANSIONS, MAX_INVOCATION_DEPTH,
    MAX_PARAMETER_RECURSION_LEVELS, MAX_TEMPLATE_RECURSION_LEVELS,
};
use crate::core::WikiError;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Title prefixes that are never expanded (matched case-insensitively at the
/// start of the expanded title).
///
/// `!` is not listed: `{{!}}` is the pipe magic word.
pub const DEFAULT_NOT_EXPAND_PATTERNS: &[&str] = &[
    "'",
    r"\s+$",
    "ISBN",
    "notelist",
    "rp",
    "MF",
    "Pie chart",
    "Graph",
    ".*Infobox",
    ".*Infotable",
    ".*Image",
    "Flag",
    "pdf",
    "increase",
    "decrease",
    "color",
];

fn default_language() -> Option<String> {
    Some("en".to_string())
}

fn default_not_expand_patterns() -> Vec<String> {
    DEFAULT_NOT_EXPAND_PATTERNS.iter().map(|p| (*p).to_string()).collect()
}

fn default_known_namespaces() -> BTreeSet<String> {
    BTreeSet::from([DEFAULT_TEMPLATE_NAMESPACE.to_string()])
}

fn default_template_namespace() -> String {
    DEFAULT_TEMPLATE_NAMESPACE.to_string()
}

fn default_accepted_link_namespaces() -> BTreeSet<String> {
    BTreeSet::from(["w".to_string()])
}

/// Recursion ceilings of the expansion core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Nested template frames before the document is discarded.
    pub max_template_depth: usize,
    /// Nested invocations before an invocation degrades to empty text.
    pub max_invocation_depth: usize,
    /// Nested placeholder substitutions before a placeholder degrades to empty text.
    pub max_parameter_depth: usize,
    /// Invocations per document before further invocations degrade to empty text.
    pub max_expansions: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_template_depth: MAX_TEMPLATE_RECURSION_LEVELS,
            max_invocation_depth: MAX_INVOCATION_DEPTH,
            max_parameter_depth: MAX_PARAMETER_RECURSION_LEVELS,
            max_expansions: MAX_EXPANSIONS,
        }
    }
}

/// Output shaping options for the formatter and the cleaning filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit section headers that precede content.
    pub keep_sections: bool,
    /// Prefix headers with `#` repeated per level.
    pub markdown_headers: bool,
    /// Render lists as HTML elements instead of `- ` bullets.
    pub html_formatting: bool,
    /// Escape `<`, `>` and `&` in the final text.
    pub html_safe: bool,
    /// Render links as `<a href>` anchors instead of flattening them to their label.
    pub keep_links: bool,
    /// Expand templates; when disabled `{{...}}` regions are removed.
    pub expand_templates: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            keep_sections: true,
            markdown_headers: false,
            html_formatting: false,
            html_safe: true,
            keep_links: false,
            expand_templates: true,
        }
    }
}

/// Values of the site-level magic words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub sitename: String,
    pub server: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sitename: "Wikipedia".to_string(),
            server: "//en.wikipedia.org".to_string(),
        }
    }
}

/// Complete extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Target display language for `lang-XX` templates. `None` disables them.
    #[serde(default = "default_language")]
    pub language: Option<String>,

    /// Section titles (lower-cased) whose content is dropped.
    #[serde(default)]
    pub discard_sections: BTreeSet<String>,

    /// Template titles that discard the whole document.
    #[serde(default)]
    pub discard_templates: BTreeSet<String>,

    /// Template titles that expand to nothing.
    #[serde(default)]
    pub ignore_templates: BTreeSet<String>,

    #[serde(default = "default_not_expand_patterns")]
    pub not_expand_patterns: Vec<String>,

    /// Namespaces a template title may already carry.
    #[serde(default = "default_known_namespaces")]
    pub known_namespaces: BTreeSet<String>,

    #[serde(default = "default_template_namespace")]
    pub template_namespace: String,

    /// Namespaces of internal links whose label is kept.
    #[serde(default = "default_accepted_link_namespaces")]
    pub accepted_link_namespaces: BTreeSet<String>,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            discard_sections: BTreeSet::new(),
            discard_templates: BTreeSet::new(),
            ignore_templates: BTreeSet::new(),
            not_expand_patterns: default_not_expand_patterns(),
            known_namespaces: default_known_namespaces(),
            template_namespace: default_template_namespace(),
            accepted_link_namespaces: default_accepted_link_namespaces(),
            limits: LimitsConfig::default(),
            output: OutputConfig::default(),
            site: SiteConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Load from the default location, falling back to defaults when no file exists.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from [`Self::default_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(_) => return Ok(Self::default()),
            },
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate the configuration stored at `path`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| WikiError::ConfigParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = config.normalized();
        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = self.to_toml()?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Platform default configuration path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine configuration directory"))?;
        Ok(config_dir.join("wikiextract").join("config.toml"))
    }

    /// Lower-case the title sets so lookups can compare against lower-cased titles.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let lower = |set: BTreeSet<String>| -> BTreeSet<String> {
            set.into_iter().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()).collect()
        };
        self.discard_sections = lower(self.discard_sections);
        self.discard_templates = lower(self.discard_templates);
        self.ignore_templates = lower(self.ignore_templates);
        self
    }

    /// Check ceilings and patterns.
    pub fn validate(&self) -> Result<(), WikiError> {
        if self.limits.max_template_depth == 0
            || self.limits.max_invocation_depth == 0
            || self.limits.max_expansions == 0
        {
            return Err(WikiError::ConfigError {
                message: "recursion ceilings must be greater than zero".to_string(),
            });
        }
        if self.template_namespace.trim().is_empty() {
            return Err(WikiError::ConfigError {
                message: "template_namespace must not be empty".to_string(),
            });
        }
        self.not_expand_regex().map(|_| ())
    }

    /// Compile the do-not-expand patterns into one anchored, case-insensitive regex.
    ///
    /// Returns `None` when the pattern list is empty.
    pub fn not_expand_regex(&self) -> Result<Option<Regex>, WikiError> {
        if self.not_expand_patterns.is_empty() {
            return Ok(None);
        }
        for pattern in &self.not_expand_patterns {
            Regex::new(pattern).map_err(|e| WikiError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
        let joined = self.not_expand_patterns.join("|");
        Regex::new(&format!("(?i)^(?:{joined})")).map(Some).map_err(|e| {
            WikiError::InvalidPattern {
                pattern: joined,
                reason: e.to_string(),
            }
        })
    }
}
