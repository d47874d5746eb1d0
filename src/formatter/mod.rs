//! Structural formatter.
//!
//! Turns cleaned, fully expanded text into the ordered list of output blocks
//! in one pass over its lines. The pass carries three pieces of state:
//!
//! - pending headers, keyed by heading level, that are only emitted once
//!   their section produces content; a heading prunes every pending deeper one
//! - whether the current section is discarded, and at which level it ends
//! - the stack of open list markers (`*`, `#`, `;`, `:`) in HTML mode
//!
//! Empty sections therefore vanish together with their headers, and residual
//! table or template lines are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExtractorConfig;

static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={2,})\s*(.*?)\s*(={2,})\s*$").unwrap());

const LIST_MARKERS: &[char] = &['*', '#', ';', ':'];

fn list_open(marker: char) -> &'static str {
    match marker {
        '*' => "<ul>",
        '#' => "<ol>",
        _ => "<dl>",
    }
}

fn list_close(marker: char) -> &'static str {
    match marker {
        '*' => "</ul>",
        '#' => "</ol>",
        _ => "</dl>",
    }
}

fn list_item(marker: char, text: &str) -> String {
    match marker {
        ';' => format!("<dt>{text}</dt>"),
        ':' => format!("<dd>{text}</dd>"),
        _ => format!("<li>{text}</li>"),
    }
}

/// Append a full stop unless the title already ends in `!` or `?`.
fn terminate(title: &str) -> String {
    match title.chars().last() {
        Some('!' | '?') | None => title.to_string(),
        Some(_) => format!("{title}."),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Emit the headers of non-empty sections.
    pub keep_sections: bool,
    /// Prefix headers with one `#` per level.
    pub markdown_headers: bool,
    /// Emit `<hN>` headers and HTML lists.
    pub html_formatting: bool,
    /// Lower-cased titles of sections to drop.
    pub discard_sections: BTreeSet<String>,
}

impl FormatOptions {
    #[must_use]
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            keep_sections: config.output.keep_sections,
            markdown_headers: config.output.markdown_headers,
            html_formatting: config.output.html_formatting,
            discard_sections: config
                .discard_sections
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
        }
    }
}

/// Line-by-line formatter state.
#[derive(Debug)]
pub struct Formatter<'a> {
    options: &'a FormatOptions,
    page: Vec<String>,
    headers: BTreeMap<usize, String>,
    empty_section: bool,
    discard_until: Option<usize>,
    list_level: Vec<char>,
}

impl<'a> Formatter<'a> {
    #[must_use]
    pub fn new(options: &'a FormatOptions) -> Self {
        Self {
            options,
            page: Vec::new(),
            headers: BTreeMap::new(),
            empty_section: false,
            discard_until: None,
            list_level: Vec::new(),
        }
    }

    fn close_lists(&mut self) {
        while let Some(marker) = self.list_level.pop() {
            self.page.push(list_close(marker).to_string());
        }
    }

    fn flush_headers(&mut self) {
        if self.headers.is_empty() {
            return;
        }
        let headers = std::mem::take(&mut self.headers);
        if self.options.keep_sections {
            if !self.page.is_empty() && !self.options.html_formatting {
                self.page.push(String::new());
            }
            self.page.extend(headers.into_values());
        }
    }

    fn render_header(&self, level: usize, title: &str) -> String {
        if self.options.html_formatting {
            format!("<h{level}>{title}</h{level}>")
        } else if self.options.markdown_headers {
            format!("{} {}", "#".repeat(level), terminate(title))
        } else {
            terminate(title)
        }
    }

    fn heading(&mut self, level: usize, title: &str) {
        if self.options.discard_sections.contains(&title.to_lowercase()) {
            self.discard_until = Some(level);
            self.empty_section = true;
            return;
        }
        let header = self.render_header(level, title);
        self.headers.retain(|&lev, _| lev < level);
        self.headers.insert(level, header);
        self.empty_section = true;
    }

    fn list_line(&mut self, line: &str) {
        let markers: Vec<char> = line.chars().take_while(|c| LIST_MARKERS.contains(c)).collect();
        let content = line[markers.iter().map(|c| c.len_utf8()).sum::<usize>()..].trim();
        self.flush_headers();
        self.empty_section = false;

        if !self.options.html_formatting {
            self.page.push(format!("- {content}"));
            return;
        }

        let common =
            self.list_level.iter().zip(&markers).take_while(|(open, new)| open == new).count();
        while self.list_level.len() > common {
            if let Some(marker) = self.list_level.pop() {
                self.page.push(list_close(marker).to_string());
            }
        }
        for &marker in &markers[common..] {
            self.page.push(list_open(marker).to_string());
            self.list_level.push(marker);
        }
        let kind = self.list_level.last().copied().unwrap_or('*');
        self.page.push(list_item(kind, content));
    }

    /// Process one line.
    pub fn line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.close_lists();
            return;
        }

        if let Some(caps) = SECTION.captures(line) {
            let level = caps[1].len().min(caps[3].len());
            match self.discard_until {
                Some(until) if level > until => return,
                _ => self.discard_until = None,
            }
            self.close_lists();
            self.heading(level, &caps[2]);
            return;
        }

        if self.discard_until.is_some() {
            return;
        }

        if let Some(title) = line.strip_prefix("++").and_then(|l| l.strip_suffix("++")) {
            let title = title.trim();
            if !title.is_empty() {
                self.page.push(terminate(title));
            }
            return;
        }

        let line = if line.starts_with(':') {
            let stripped = line.trim_start_matches(':');
            if stripped.trim().is_empty() {
                return;
            }
            stripped
        } else {
            line
        };

        if line.starts_with(['*', '#', ';']) {
            self.list_line(line);
            return;
        }
        self.close_lists();

        let trimmed = line.trim();
        if trimmed.starts_with('{') || trimmed.ends_with('}') {
            return;
        }
        if (trimmed.starts_with('(') && trimmed.ends_with(')'))
            || trimmed.trim_matches(['.', '-']).is_empty()
        {
            return;
        }

        if !self.headers.is_empty() {
            self.flush_headers();
            self.page.push(line.to_string());
            self.empty_section = false;
        } else if !self.empty_section {
            self.page.push(line.to_string());
        }
    }

    /// Close open lists and return the emitted blocks.
    #[must_use]
    pub fn finish(mut self) -> Vec<String> {
        self.close_lists();
        self.page
    }
}

/// Format `text` into output blocks.
#[must_use]
pub fn format_text(text: &str, options: &FormatOptions) -> Vec<String> {
    let mut formatter = Formatter::new(options);
    for line in text.split('\n') {
        formatter.line(line);
    }
    formatter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FormatOptions {
        FormatOptions {
            keep_sections: true,
            ..FormatOptions::default()
        }
    }

    fn lines(text: &[&str]) -> String {
        text.join("\n")
    }

    #[test]
    fn test_paragraphs_and_headers() {
        let text = lines(&["Intro line.", "", "== History ==", "Founded long ago."]);
        assert_eq!(format_text(&text, &options()), vec!["Intro line.", "", "History.", "Founded long ago."]);
    }

    #[test]
    fn test_empty_section_is_dropped() {
        let text = lines(&["== Empty ==", "", "== Full? ==", "content"]);
        assert_eq!(format_text(&text, &options()), vec!["Full?", "content"]);
    }

    #[test]
    fn test_deeper_headers_pruned_by_shallower() {
        let text = lines(&["== A ==", "=== A1 ===", "== B ==", "text"]);
        assert_eq!(format_text(&text, &options()), vec!["B.", "text"]);
    }

    #[test]
    fn test_discarded_section() {
        let mut opts = options();
        opts.discard_sections.insert("references".to_string());
        let text = lines(&[
            "== References ==",
            "ref one",
            "=== Notes ===",
            "note",
            "== Legacy ==",
            "kept",
        ]);
        assert_eq!(format_text(&text, &opts), vec!["Legacy.", "kept"]);
    }

    #[test]
    fn test_pending_headers_flush_before_list() {
        let text = lines(&["== Works ==", "=== Books ===", "* First", "** Second"]);
        assert_eq!(
            format_text(&text, &options()),
            vec!["Works.", "Books.", "- First", "- Second"]
        );
    }

    #[test]
    fn test_markdown_headers() {
        let opts = FormatOptions {
            markdown_headers: true,
            ..options()
        };
        let text = lines(&["=== Deep ===", "x"]);
        assert_eq!(format_text(&text, &opts), vec!["### Deep.", "x"]);
    }

    #[test]
    fn test_sections_not_kept() {
        let opts = FormatOptions::default();
        let text = lines(&["== History ==", "text"]);
        assert_eq!(format_text(&text, &opts), vec!["text"]);
    }

    #[test]
    fn test_residual_lines_dropped() {
        let text = lines(&["{| class", "(note)", "...", "--", "real}", "kept"]);
        assert_eq!(format_text(&text, &options()), vec!["kept"]);
    }

    #[test]
    fn test_indent_and_page_title() {
        let text = lines(&["++Paris++", ":: indented", ":", ": "]);
        assert_eq!(format_text(&text, &options()), vec!["Paris.", " indented"]);
    }

    #[test]
    fn test_html_lists() {
        let opts = FormatOptions {
            html_formatting: true,
            ..options()
        };
        let text = lines(&["* a", "** b", "* c", "# d", "", "after"]);
        assert_eq!(
            format_text(&text, &opts),
            vec![
                "<ul>",
                "<li>a</li>",
                "<ul>",
                "<li>b</li>",
                "</ul>",
                "<li>c</li>",
                "</ul>",
                "<ol>",
                "<li>d</li>",
                "</ol>",
                "after",
            ]
        );
    }

    #[test]
    fn test_html_headers_and_definition_lists() {
        let opts = FormatOptions {
            html_formatting: true,
            ..options()
        };
        let text = lines(&["== Terms ==", "; word", ";: meaning"]);
        assert_eq!(
            format_text(&text, &opts),
            vec!["<h2>Terms</h2>", "<dl>", "<dt>word</dt>", "<dl>", "<dd>meaning</dd>", "</dl>", "</dl>"]
        );
    }
}
