//! Quote formatting and whitespace/punctuation normalisation.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'''''(.*?)'''''").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'''(.*?)'''").unwrap());
static ITALIC_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"''"([^"]*?)"''"#).unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"''(.*?)''").unwrap());
static QUOTE_QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"""([^"]*?)"""#).unwrap());

static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{4,}").unwrap());
static SPACE_BEFORE_CLOSING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([,:.)\]»])").unwrap());
static SPACE_AFTER_OPENING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\[(«]) ").unwrap());
static PUNCTUATION_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\W+?\n").unwrap());

/// Convert `'''bold'''` and `''italic''` quotes.
///
/// With `html_formatting` they become `<b>` / `<i>` elements, otherwise bold
/// is unwrapped and italics are rendered in double quotes. Unbalanced quote
/// runs left over are removed.
#[must_use]
pub fn clean_quotes(text: &str, html_formatting: bool) -> String {
    let text = if html_formatting {
        let text = BOLD_ITALIC.replace_all(text, "<b>${1}</b>");
        let text = BOLD.replace_all(&text, "<b>${1}</b>");
        ITALIC.replace_all(&text, "<i>${1}</i>").into_owned()
    } else {
        let text = BOLD_ITALIC.replace_all(text, "${1}");
        let text = BOLD.replace_all(&text, "${1}");
        let text = ITALIC_QUOTE.replace_all(&text, "\"${1}\"");
        let text = ITALIC.replace_all(&text, "\"${1}\"");
        QUOTE_QUOTE.replace_all(&text, "\"${1}\"").into_owned()
    };
    text.replace("'''", "").replace("''", "\"")
}

/// Final whitespace and punctuation cleanup.
///
/// Tabs and runs of spaces collapse to one space, long ellipses to `...`, and
/// spaces inside brackets or before closing punctuation go away. Lines made
/// only of punctuation are dropped. With `html_safe`, `<`, `>` and `&` are
/// escaped.
#[must_use]
pub fn normalize(text: &str, html_safe: bool) -> String {
    let text = text.replace('\t', " ");
    let text = SPACES.replace_all(&text, " ");
    let text = DOTS.replace_all(&text, "...");
    let text = SPACE_BEFORE_CLOSING.replace_all(&text, "${1}");
    let text = SPACE_AFTER_OPENING.replace_all(&text, "${1}");
    let text = PUNCTUATION_LINE.replace_all(&text, "\n");
    let text = text.replace(",,", ",").replace(",.", ".");
    if html_safe { html_escape::encode_text(&text).into_owned() } else { text }
}
