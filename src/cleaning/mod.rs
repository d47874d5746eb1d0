//! Inline markup filters.
//!
//! Everything here is a pure `&str -> String` function without recursion or
//! state. The extractor runs them around template expansion:
//!
//! ```text
//! raw -> drop_comments -> clean_math -> (expand | drop_templates) -> clean_text -> formatter
//! ```
//!
//! [`flatten_html`] is also called by the expander on every instantiated
//! template body.

pub mod html;
pub mod links;
pub mod math;
pub mod text;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExtractorConfig;
use crate::scanner::drop_nested_literal;
use crate::templating::magic_words::BEHAVIOUR_SWITCHES;

pub use html::{clean_html, drop_comments, flatten_html};
pub use links::{LinkOptions, clean_external_links, clean_internal_links};
pub use math::clean_math;
pub use text::{clean_quotes, normalize};

static BEHAVIOUR_SWITCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&BEHAVIOUR_SWITCHES.join("|")).unwrap());

/// Options of the cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    pub html_safe: bool,
    pub html_formatting: bool,
    pub links: LinkOptions,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            html_safe: true,
            html_formatting: false,
            links: LinkOptions::default(),
        }
    }
}

impl CleanOptions {
    #[must_use]
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            html_safe: config.output.html_safe,
            html_formatting: config.output.html_formatting,
            links: LinkOptions {
                keep_links: config.output.keep_links,
                accepted_namespaces: config.accepted_link_namespaces.clone(),
            },
        }
    }
}

/// Remove `__NOTOC__` and the other behaviour switches.
#[must_use]
pub fn drop_behaviour_switches(text: &str) -> String {
    BEHAVIOUR_SWITCH.replace_all(text, "").into_owned()
}

/// Remove `{| ... |}` tables, nested ones included.
#[must_use]
pub fn drop_tables(text: &str) -> String {
    drop_nested_literal(text, "{|", "|}")
}

/// Remove every `{{...}}` region; used when template expansion is disabled.
#[must_use]
pub fn drop_templates(text: &str) -> String {
    drop_nested_literal(text, "{{", "}}")
}

/// Turn expanded wikitext into clean text, line structure preserved.
#[must_use]
pub fn clean_text(text: &str, options: &CleanOptions) -> String {
    let text = drop_tables(text);
    let text = drop_behaviour_switches(&text);
    let text = clean_math(&text);
    let text = clean_quotes(&text, options.html_formatting);
    let text = clean_html(&text, options.html_formatting);
    let text = clean_external_links(&text, &options.links);
    let text = clean_internal_links(&text, &options.links);
    normalize(&text, options.html_safe)
}
