//! Magic words: variables resolved without a template lookup.
//!
//! Values are computed once per document from the page title, the site
//! settings and a timestamp, so a document expands identically no matter how
//! long it takes to process.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};

use crate::config::SiteConfig;

/// Behaviour switches such as `__NOTOC__`, removed from article text.
pub const BEHAVIOUR_SWITCHES: &[&str] = &[
    "__NOTOC__",
    "__FORCETOC__",
    "__TOC__",
    "__NEWSECTIONLINK__",
    "__NONEWSECTIONLINK__",
    "__NOGALLERY__",
    "__HIDDENCAT__",
    "__NOCONTENTCONVERT__",
    "__NOCC__",
    "__NOTITLECONVERT__",
    "__NOTC__",
    "__START__",
    "__END__",
    "__INDEX__",
    "__NOINDEX__",
    "__STATICREDIRECT__",
    "__DISAMBIG__",
];

#[derive(Debug, Clone, Default)]
pub struct MagicWords {
    values: HashMap<String, String>,
}

impl MagicWords {
    /// Magic words for the page `title`, evaluated at `now`.
    #[must_use]
    pub fn for_page(title: &str, site: &SiteConfig, language: &str, now: DateTime<Utc>) -> Self {
        let mut words = Self::default();
        words.insert("!", "|");
        words.insert("=", "=");

        let (namespace, page) = match title.split_once(':') {
            Some((ns, page)) if !ns.is_empty() => (ns, page),
            _ => ("", title),
        };
        let subpage = page.rsplit('/').next().unwrap_or(page);
        let base = page.rsplit_once('/').map_or(page, |(base, _)| base);
        let root = page.split('/').next().unwrap_or(page);

        words.insert("pagename", page);
        words.insert("pagenamee", &page.replace(' ', "_"));
        words.insert("fullpagename", title);
        words.insert("fullpagenamee", &title.replace(' ', "_"));
        words.insert("namespace", namespace);
        words.insert("namespacee", &namespace.replace(' ', "_"));
        words.insert("subpagename", subpage);
        words.insert("basepagename", base);
        words.insert("rootpagename", root);

        words.insert("sitename", &site.sitename);
        words.insert("server", &site.server);
        let servername = site.server.trim_start_matches("https:").trim_start_matches("http:");
        words.insert("servername", servername.trim_start_matches("//"));
        words.insert("contentlanguage", language);
        words.insert("directionmark", "\u{200e}");

        words.insert_clock("current", &now);
        words.insert_clock("local", &now.with_timezone(&Local));
        words
    }

    fn insert_clock<Tz: chrono::TimeZone>(&mut self, prefix: &str, at: &DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        let formats = [
            ("year", "%Y"),
            ("month", "%m"),
            ("month1", "%-m"),
            ("monthname", "%B"),
            ("monthnamegen", "%B"),
            ("monthabbrev", "%b"),
            ("day", "%-d"),
            ("day2", "%d"),
            ("dayname", "%A"),
            ("dow", "%w"),
            ("week", "%-V"),
            ("hour", "%H"),
            ("time", "%H:%M"),
            ("timestamp", "%Y%m%d%H%M%S"),
        ];
        for (name, format) in formats {
            self.insert(&format!("{prefix}{name}"), &at.format(format).to_string());
        }
    }

    fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    /// Value of the magic word `name` (case-insensitive, surrounding spaces ignored).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.trim().to_lowercase()).map(String::as_str)
    }
}
