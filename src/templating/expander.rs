//! The expansion coordinator.
//!
//! [`TemplateExpander`] replaces every top-level `{{...}}` invocation in a text
//! with its expansion, recursively, against a [`TemplateStore`]. One expander
//! serves exactly one document: it owns the frame stack, the parsed-template
//! cache and the diagnostic counters, and nothing in it is shared.
//!
//! # Termination
//!
//! Three depth ceilings and one per-document budget bound the work done for
//! any input:
//!
//! | Guard | Checked in | On overflow |
//! |---|---|---|
//! | template frames | [`TemplateExpander::expand_all`] | the document is discarded |
//! | nested invocations | [`TemplateExpander::expand_one`] | this and every later invocation expands to nothing |
//! | invocations per document | [`TemplateExpander::expand_one`] | this and every later invocation expands to nothing |
//! | nested placeholders | [`crate::templating::ast::TemplateArg::substitute`] | the placeholder expands to nothing |
//!
//! Each overflow increments its own counter in [`ExpansionStats`]. The
//! invocation guards latch: a template that branches at every level would
//! otherwise re-run each sibling branch up to the ceiling.
//!
//! # Discard
//!
//! An invocation of a deny-listed title, at any depth, poisons the document.
//! Every operation returns `Result<String, Discard>` so that `?` carries the
//! signal to the caller unchanged.
//!
//! # Resolution order for one invocation
//!
//! 1. expand the title; a discard while doing so propagates
//! 2. do-not-expand patterns, ignore list, discard list
//! 3. pseudo-templates (`lang-XX`, `lang`, `IPA`, `segle`, `coord`, `audio`)
//! 4. `subst:` / `safesubst:` prefix, magic words, parser functions
//! 5. qualification, redirect, cache or store lookup
//! 6. argument expansion, frame push, substitution, HTML flattening,
//!    re-expansion, brace rebalancing, frame pop

use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::cleaning::flatten_html;
use crate::config::{ExtractorConfig, LimitsConfig};
use crate::core::{Discard, WikiError};
use crate::scanner::{balance_brackets, find_matching_braces, split_top_level};
use crate::templating::ast::{ArgumentExpander, Template};
use crate::templating::builtins::{self, PseudoTemplate};
use crate::templating::cache::TemplateCache;
use crate::templating::functions;
use crate::templating::locale::{BuiltinLocales, LocaleResolver};
use crate::templating::magic_words::MagicWords;
use crate::templating::params::ParameterTable;
use crate::templating::store::{TemplateStore, TitleResolver, transclusion_body};

static SUBST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:safe)?subst:").unwrap());

static BUILTIN_LOCALES: BuiltinLocales = BuiltinLocales;

/// Read-only expansion settings compiled from an [`ExtractorConfig`].
///
/// Shared by every worker; build it once per run.
#[derive(Debug, Clone)]
pub struct ExpansionSettings {
    pub language: Option<String>,
    pub discard_templates: BTreeSet<String>,
    pub ignore_templates: BTreeSet<String>,
    pub not_expand: Option<Regex>,
    pub titles: TitleResolver,
    pub limits: LimitsConfig,
    pub site: crate::config::SiteConfig,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        let config = ExtractorConfig::default();
        Self {
            language: config.language,
            discard_templates: config.discard_templates,
            ignore_templates: config.ignore_templates,
            not_expand: None,
            titles: TitleResolver::default(),
            limits: config.limits,
            site: config.site,
        }
    }
}

impl ExpansionSettings {
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, WikiError> {
        let config = config.clone().normalized();
        Ok(Self {
            not_expand: config.not_expand_regex()?,
            titles: TitleResolver::new(config.known_namespaces.clone(), &config.template_namespace),
            language: config.language,
            discard_templates: config.discard_templates,
            ignore_templates: config.ignore_templates,
            limits: config.limits,
            site: config.site,
        })
    }

    /// Lower-cased title with the template namespace removed, as used by
    /// the ignore and discard lists.
    fn list_key(&self, title: &str) -> String {
        let lower = title.trim().to_lowercase();
        match lower.split_once(':') {
            Some((ns, rest)) if self.titles.is_namespace(ns) => rest.trim().to_string(),
            _ => lower,
        }
    }

    fn is_ignored(&self, title: &str) -> bool {
        self.ignore_templates.contains(&self.list_key(title))
    }

    fn is_discarded(&self, title: &str) -> bool {
        self.discard_templates.contains(&self.list_key(title))
    }

    fn is_not_expanded(&self, title: &str) -> bool {
        self.not_expand.as_ref().is_some_and(|re| re.is_match(title))
    }
}

/// Diagnostics gathered while expanding one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Frame ceiling hits (each one discards the document)
    pub template_depth_exceeded: usize,
    /// Invocation ceiling hits
    pub invocation_depth_exceeded: usize,
    /// Placeholder ceiling hits
    pub parameter_depth_exceeded: usize,
    /// Invocations expanded
    pub invocations: usize,
    /// Whether the per-document invocation budget ran out
    pub expansion_budget_exceeded: bool,
    /// Titles that could not be qualified
    pub title_errors: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Template that caused the document to be discarded
    pub discarded_by: Option<String>,
}

impl ExpansionStats {
    /// Whether any ceiling or title error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.template_depth_exceeded
            + self.invocation_depth_exceeded
            + self.parameter_depth_exceeded
            + self.title_errors
            > 0
            || self.expansion_budget_exceeded
    }
}

/// One active template invocation.
#[derive(Debug, Clone)]
pub struct Frame {
    pub title: String,
    pub params: Rc<ParameterTable>,
}

/// Per-document expansion engine.
pub struct TemplateExpander<'a> {
    store: &'a dyn TemplateStore,
    settings: &'a ExpansionSettings,
    locales: &'a dyn LocaleResolver,
    magic_words: MagicWords,
    cache: TemplateCache,
    frames: Vec<Frame>,
    invocation_depth: usize,
    exhausted: bool,
    stats: ExpansionStats,
}

impl<'a> TemplateExpander<'a> {
    /// Expander for the page `title`, with magic words evaluated now.
    pub fn new(store: &'a dyn TemplateStore, settings: &'a ExpansionSettings, title: &str) -> Self {
        Self::at(store, settings, title, Utc::now())
    }

    /// Expander whose clock magic words are evaluated at `now`.
    pub fn at(
        store: &'a dyn TemplateStore,
        settings: &'a ExpansionSettings,
        title: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let language = settings.language.as_deref().unwrap_or("en");
        Self {
            store,
            settings,
            locales: &BUILTIN_LOCALES,
            magic_words: MagicWords::for_page(title, &settings.site, language, now),
            cache: TemplateCache::new(),
            frames: Vec::new(),
            invocation_depth: 0,
            exhausted: false,
            stats: ExpansionStats::default(),
        }
    }

    #[must_use]
    pub fn with_locales(mut self, locales: &'a dyn LocaleResolver) -> Self {
        self.locales = locales;
        self
    }

    /// Diagnostics so far, including cache statistics.
    #[must_use]
    pub fn stats(&self) -> ExpansionStats {
        let (hits, misses) = self.cache.stats();
        ExpansionStats {
            cache_hits: hits,
            cache_misses: misses,
            ..self.stats.clone()
        }
    }

    /// Active frames, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Expand every top-level invocation in `text`, left to right.
    pub fn expand_all(&mut self, text: &str) -> Result<String, Discard> {
        if self.frames.len() >= self.settings.limits.max_template_depth {
            self.stats.template_depth_exceeded += 1;
            let title = self.frames.last().map(|f| f.title.clone()).unwrap_or_default();
            warn!("Template nesting reached {} frames in '{title}'", self.frames.len());
            return Err(Discard::recursion_limit(title, self.frames.len()));
        }

        let spans = find_matching_braces(text, 2);
        if spans.is_empty() {
            return Ok(text.to_string());
        }

        let mut result = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in spans {
            let content = self.expand_one(&text[span.start + 2..span.end - 2])?;
            result.push_str(&text[cursor..span.start]);
            result.push_str(&content);
            cursor = span.end;
        }
        result.push_str(&text[cursor..]);
        Ok(result)
    }

    /// Expand the interior of one `{{...}}` invocation.
    pub fn expand_one(&mut self, body: &str) -> Result<String, Discard> {
        if self.exhausted {
            return Ok(String::new());
        }
        if self.invocation_depth >= self.settings.limits.max_invocation_depth {
            self.stats.invocation_depth_exceeded += 1;
            self.exhausted = true;
            debug!("Invocation nesting reached {}", self.invocation_depth);
            return Ok(String::new());
        }
        if self.stats.invocations >= self.settings.limits.max_expansions {
            self.stats.expansion_budget_exceeded = true;
            self.exhausted = true;
            warn!("Expansion budget of {} invocations spent", self.stats.invocations);
            return Ok(String::new());
        }
        self.stats.invocations += 1;

        self.invocation_depth += 1;
        let result = self.invoke(body);
        self.invocation_depth -= 1;
        result
    }

    fn invoke(&mut self, body: &str) -> Result<String, Discard> {
        trace!("INVOCATION {} {}", self.frames.len(), body);
        let parts = split_top_level(body, '|');
        let raw_title = parts.first().map_or("", |p| p.trim());
        let expanded_title = self.expand_all(raw_title)?;
        let title = expanded_title.trim();

        if self.settings.is_not_expanded(title) {
            return Ok(String::new());
        }
        if self.settings.is_ignored(title) {
            return Ok(String::new());
        }
        if self.settings.is_discarded(title) {
            debug!("Discard template '{title}' invoked");
            self.stats.discarded_by = Some(title.to_string());
            return Err(Discard::template(title));
        }
        if let Some(kind) = PseudoTemplate::classify(title) {
            return self.pseudo_template(kind, title, &parts);
        }

        let (title, subst) = match SUBST_PREFIX.find(title) {
            Some(m) => (title[m.end()..].trim(), true),
            None => (title, false),
        };

        if let Some(value) = self.magic_words.get(title) {
            return Ok(value.to_string());
        }

        if let Some(colon) = title.find(':') {
            let name = &title[..colon];
            if colon > 1 && !self.settings.titles.is_namespace(name) {
                return self.parser_function(name, title[colon + 1..].trim(), &parts[1..]);
            }
        }

        let qualified = self.settings.titles.qualify(title);
        if qualified.is_empty() {
            self.stats.title_errors += 1;
            debug!("Cannot qualify template title '{title}'");
            return Ok(String::new());
        }
        let qualified = match self.store.redirect(&qualified) {
            Some(target) => self.settings.titles.qualify(target),
            None => qualified,
        };

        let Some(template) = self.template(&qualified) else {
            trace!("Template '{qualified}' not found");
            return Ok(String::new());
        };

        let mut arguments = Vec::with_capacity(parts.len().saturating_sub(1));
        for raw in &parts[1..] {
            if subst {
                arguments.push(raw.clone());
            } else {
                arguments.push(self.expand_all(raw)?);
            }
        }
        let params = Rc::new(ParameterTable::bind(&arguments));

        self.frames.push(Frame {
            title: qualified,
            params: Rc::clone(&params),
        });
        let outcome = self.instantiate(&template, &params);
        self.frames.pop();
        outcome
    }

    fn instantiate(&mut self, template: &Template, params: &ParameterTable) -> Result<String, Discard> {
        let instantiated = template.substitute(params, self, 0)?;
        let flattened = flatten_html(&instantiated);
        let value = self.expand_all(&flattened)?;
        Ok(balance_brackets(&value))
    }

    fn parser_function(
        &mut self,
        name: &str,
        first: &str,
        rest: &[String],
    ) -> Result<String, Discard> {
        if !functions::is_parser_function(name) {
            trace!("Unknown parser function '{name}'");
            return Ok(String::new());
        }
        let mut arguments = Vec::with_capacity(rest.len() + 1);
        arguments.push(first.to_string());
        for raw in rest {
            arguments.push(self.expand_all(raw)?);
        }
        let result = functions::call_parser_function(name, &arguments);
        self.expand_all(&result)
    }

    fn pseudo_template(
        &mut self,
        kind: PseudoTemplate,
        title: &str,
        parts: &[String],
    ) -> Result<String, Discard> {
        let value = match kind {
            PseudoTemplate::LangVariant => builtins::lang_variant(
                title,
                parts,
                self.settings.language.as_deref(),
                self.locales,
            ),
            PseudoTemplate::Lang => builtins::lang(parts),
            PseudoTemplate::Ipa => builtins::ipa(parts),
            PseudoTemplate::Century => {
                let Some(numeral) = parts.get(1) else {
                    return Ok(String::new());
                };
                let numeral = self.expand_all(&format!("{{{{uc:{numeral}}}}}"))?;
                builtins::century(&numeral, parts.get(2).map(String::as_str))
            }
            PseudoTemplate::Coord => builtins::coord(parts),
            PseudoTemplate::Audio => builtins::audio(parts),
        };
        Ok(value)
    }

    /// Parsed body of `title` from the cache, or from the store on first use.
    fn template(&mut self, title: &str) -> Option<Rc<Template>> {
        if let Some(template) = self.cache.get(title) {
            return Some(template);
        }
        let raw = self.store.lookup(title)?;
        let template = Rc::new(Template::parse(&transclusion_body(raw)));
        self.cache.insert(title.to_string(), Rc::clone(&template));
        Some(template)
    }
}

impl ArgumentExpander for TemplateExpander<'_> {
    fn expand_text(&mut self, text: &str) -> Result<String, Discard> {
        self.expand_all(text)
    }

    fn parameter_depth_limit(&self) -> usize {
        self.settings.limits.max_parameter_depth
    }

    fn record_parameter_overflow(&mut self) {
        self.stats.parameter_depth_exceeded += 1;
    }
}
