//! HTML tag and entity cleanup.

use std::sync::LazyLock;

use regex::Regex;

use crate::scanner::{Span, drop_nested, drop_spans};

/// Tags removed with their attributes while their content is kept.
const IGNORED_TAGS: &[&str] = &[
    "abbr",
    "b",
    "big",
    "blockquote",
    "center",
    "cite",
    "code",
    "div",
    "em",
    "font",
    "h1",
    "h2",
    "h3",
    "h4",
    "hiero",
    "i",
    "kbd",
    "nowiki",
    "p",
    "plaintext",
    "s",
    "span",
    "strike",
    "strong",
    "sub",
    "sup",
    "tt",
    "u",
    "var",
];

/// Elements removed together with everything they contain.
const DISCARD_ELEMENTS: &[&str] = &[
    "gallery",
    "timeline",
    "noinclude",
    "pre",
    "table",
    "tr",
    "td",
    "th",
    "caption",
    "form",
    "input",
    "select",
    "option",
    "textarea",
    "ul",
    "li",
    "ol",
    "dl",
    "dt",
    "dd",
    "menu",
    "dir",
    "ref",
    "references",
    "img",
    "imagemap",
    "source",
    "small",
];

const SELF_CLOSING_TAGS: &[&str] = &["br", "hr", "nobr", "ref", "references", "nowiki"];

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[A-Za-z][^<>]*>").unwrap());

static SYNTAX_HIGHLIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<syntaxhighlight\b[^>]*>(.*?)</syntaxhighlight\s*>").unwrap()
});

static SELF_CLOSING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?is)<\s*(?:{})\b[^>]*/\s*>", SELF_CLOSING_TAGS.join("|"))).unwrap()
});

static IGNORED_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?is)<(?:{})\b[^>]*>", IGNORED_TAGS.join("|"))).unwrap()
});

static IGNORED_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)</\s*(?:{})\s*>", IGNORED_TAGS.join("|"))).unwrap()
});

static DISCARD_PATTERNS: LazyLock<Vec<(Regex, Regex)>> = LazyLock::new(|| {
    DISCARD_ELEMENTS
        .iter()
        .map(|tag| {
            (
                Regex::new(&format!(r"(?i)<\s*{tag}\b[^>/]*>")).unwrap(),
                Regex::new(&format!(r"(?i)<\s*/\s*{tag}\s*>")).unwrap(),
            )
        })
        .collect()
});

/// Remove `<!-- ... -->` comments.
#[must_use]
pub fn drop_comments(text: &str) -> String {
    COMMENT.replace_all(text, "").into_owned()
}

/// Collapse a fragment to its text content.
///
/// Comments and every tag are removed, entities are decoded. Malformed markup
/// such as a lone `<` is left untouched.
#[must_use]
pub fn flatten_html(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return fragment.to_string();
    }
    let text = drop_comments(fragment);
    let text = ANY_TAG.replace_all(&text, "");
    html_escape::decode_html_entities(&text).into_owned()
}

/// Remove article-level HTML.
///
/// Self-closing tags and the tags of formatting elements go away, while the
/// text inside formatting elements stays. Discarded elements such as
/// `<ref>` or `<gallery>` disappear with their content. Unless
/// `html_formatting` is set, entities are decoded. `<<` and `>>` become
/// guillemets.
#[must_use]
pub fn clean_html(text: &str, html_formatting: bool) -> String {
    let text = SYNTAX_HIGHLIGHT.replace_all(text, "${1}");

    let mut spans: Vec<Span> = Vec::new();
    for re in [&*COMMENT, &*SELF_CLOSING, &*IGNORED_OPEN, &*IGNORED_CLOSE] {
        spans.extend(re.find_iter(&text).map(|m| Span::new(m.start(), m.end())));
    }
    let mut text = drop_spans(spans, &text);

    for (open, close) in DISCARD_PATTERNS.iter() {
        text = drop_nested(&text, open, close);
    }

    if !html_formatting {
        text = html_escape::decode_html_entities(&text).into_owned();
    }

    text.replace("<<", "«").replace(">>", "»")
}
