//! External `[url label]` and internal `[[Target|label]]` links.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::scanner::split_top_level;

const URL_PROTOCOLS: &[&str] = &[
    "bitcoin:",
    "ftp://",
    "ftps://",
    "geo:",
    "git://",
    "gopher://",
    "http://",
    "https://",
    "irc://",
    "ircs://",
    "magnet:",
    "mailto:",
    "mms://",
    "news:",
    "nntp://",
    "redis://",
    "sftp://",
    "sip:",
    "sips:",
    "sms:",
    "ssh://",
    "svn://",
    "tel:",
    "telnet://",
    "urn:",
    "worldwind://",
    "xmpp:",
    "//",
];

const URL_CHAR: &str = r#"[^\]\[<>"\x00-\x20\x7F\s]"#;

static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    let protocols: Vec<String> = URL_PROTOCOLS.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(
        r"(?is)\[((?:{}){URL_CHAR}+)\s*([^\]\x00-\x08\x0a-\x1F]*?)\]",
        protocols.join("|")
    ))
    .unwrap()
});

static EXTERNAL_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^https?://{URL_CHAR}+/[A-Za-z0-9_.,~%\-+&;#*?!=()@\x{{80}}-\x{{FF}}]+\.(?:gif|png|jpg|jpeg)$"
    ))
    .unwrap()
});

static TRAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+").unwrap());

/// Link rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Render `<a href>` anchors instead of bare labels.
    pub keep_links: bool,
    /// Namespaces whose internal links keep their label.
    pub accepted_namespaces: BTreeSet<String>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            keep_links: false,
            accepted_namespaces: BTreeSet::from(["w".to_string()]),
        }
    }
}

fn external_link(url: &str, label: &str, keep_links: bool) -> String {
    if !keep_links {
        return label.to_string();
    }
    let href = Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string());
    format!("<a href=\"{href}\">{label}</a>")
}

/// Replace `[url label]` with its label.
///
/// A label that is itself an image URL renders as the (empty) image alt text.
#[must_use]
pub fn clean_external_links(text: &str, options: &LinkOptions) -> String {
    EXTERNAL_LINK
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let url = &caps[1];
            let label = &caps[2];
            if EXTERNAL_IMAGE.is_match(label) {
                let image = if options.keep_links {
                    format!("<img src=\"{label}\" alt=\"\">")
                } else {
                    String::new()
                };
                external_link(url, &image, options.keep_links)
            } else {
                external_link(url, label, options.keep_links)
            }
        })
        .into_owned()
}

/// Outermost `[[...]]` spans.
fn link_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"[[" => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
                i += 2;
            }
            b"]]" if depth > 0 => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    spans.push((start, i));
                }
            }
            _ => i += 1,
        }
    }
    spans
}

fn is_accepted(title: &str, options: &LinkOptions) -> bool {
    let namespace = match title.strip_prefix(':') {
        Some(rest) => rest.split_once(':').map(|(ns, _)| ns).filter(|ns| ns.len() > 1),
        None => title.split_once(':').map(|(ns, _)| ns).filter(|ns| !ns.is_empty()),
    };
    namespace.is_none_or(|ns| options.accepted_namespaces.contains(ns))
}

fn internal_link(title: &str, label: &str, options: &LinkOptions) -> String {
    if !is_accepted(title, options) {
        return String::new();
    }
    if options.keep_links {
        let href: String = url::form_urlencoded::byte_serialize(title.as_bytes()).collect();
        format!("<a href=\"{href}\">{label}</a>")
    } else {
        label.to_string()
    }
}

/// Replace `[[Target|label]]trail` with `labeltrail`.
///
/// Links into namespaces other than the accepted ones (files, categories,
/// interwiki) are removed. The label is the text after the last top-level
/// `|` and may itself contain links.
#[must_use]
pub fn clean_internal_links(text: &str, options: &LinkOptions) -> String {
    let spans = link_spans(text);
    if spans.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in spans {
        let (trail, next) = match TRAIL.find(&text[end..]) {
            Some(m) => (m.as_str(), end + m.end()),
            None => ("", end),
        };

        let inner = &text[start + 2..end - 2];
        let parts = split_top_level(inner, '|');
        let title = parts[0].trim();
        let label = if parts.len() > 1 {
            clean_internal_links(parts[parts.len() - 1].trim(), options)
        } else {
            title.to_string()
        };

        result.push_str(&text[cursor..start]);
        let link = internal_link(title, &label, options);
        if !link.is_empty() {
            result.push_str(&link);
            result.push_str(trail);
        }
        cursor = next;
    }
    result.push_str(&text[cursor..]);
    result
}
