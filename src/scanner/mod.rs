//! Balanced-delimiter scanning over wikitext buffers.
//!
//! Every component above the scanner works on raw text and needs to locate
//! nested `{{ }}` / `{{{ }}}` / `[[ ]]` regions without a grammar-aware parser.
//! The functions in this module are pure: they take a buffer, return spans or
//! a rewritten copy, and never fail on malformed input.
//!
//! # Brace runs
//!
//! Wikitext is ambiguous when brace runs of different lengths meet, e.g.
//! `{{{{{#if:x|a}}|b}}}`. The scanner resolves this the way the reference wiki
//! engine does: a run of opening braces is recorded as one stack entry, and a
//! run of closing braces consumes the innermost braces of the entry on top of
//! the stack, preferring a three-brace match and falling back to two:
//!
//! ```text
//! {{{{{ x }}}}}  ->  {{ {{{ x }}} }}
//! {{{{ x }}}}    ->  { {{{ x }}} }
//! {{{ x }}       ->  { {{ x }}
//! ```
//!
//! An opener that is never closed yields no span; a stray closer is skipped.
//!
//! # Operations
//!
//! - [`find_matching_braces`] - outermost spans of a given brace width
//! - [`split_top_level`] - split on a separator outside `{{ }}` and `[[ ]]`
//! - [`drop_nested`] / [`drop_spans`] - delete balanced regions matched by patterns
//! - [`balance_brackets`] - pad dangling braces after substitution

use regex::Regex;

/// A half-open `[start, end)` byte range into a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
        }
    }

    /// Whether `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A matched brace span together with the number of braces on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceSpan {
    pub span: Span,
    pub width: usize,
}

struct OpenRun {
    pos: usize,
    count: usize,
}

fn run_length(bytes: &[u8], from: usize, byte: u8) -> usize {
    bytes[from..].iter().take_while(|b| **b == byte).count()
}

/// Scan `text` once and return every matched two- and three-brace span.
///
/// Spans are returned in closing order, which means inner spans come before
/// the spans that contain them. Spans never cross: any two are either disjoint
/// or nested.
#[must_use]
pub fn brace_spans(text: &str) -> Vec<BraceSpan> {
    let bytes = text.as_bytes();
    let mut stack: Vec<OpenRun> = Vec::new();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let count = run_length(bytes, i, b'{');
                stack.push(OpenRun {
                    pos: i,
                    count,
                });
                i += count;
            }
            b'}' => {
                let count = run_length(bytes, i, b'}');
                let mut remaining = count;
                let mut cursor = i;
                while remaining >= 2 {
                    let Some(top) = stack.last_mut() else {
                        break;
                    };
                    if top.count < 2 {
                        stack.pop();
                        continue;
                    }
                    let width = if top.count >= 3 && remaining >= 3 {
                        3
                    } else {
                        2
                    };
                    let start = top.pos + top.count - width;
                    spans.push(BraceSpan {
                        span: Span::new(start, cursor + width),
                        width,
                    });
                    top.count -= width;
                    if top.count < 2 {
                        stack.pop();
                    }
                    remaining -= width;
                    cursor += width;
                }
                i += count;
            }
            _ => i += 1,
        }
    }

    spans
}

/// Return the outermost spans delimited by exactly `width` braces
/// (2 for templates, 3 for template arguments), ordered left to right.
///
/// A span of the requested width that sits inside another span of the same
/// width is not reported; spans of the other width do not hide it.
///
/// # Examples
///
/// ```rust,ignore
/// let spans = find_matching_braces("a {{b|{{c}}}} d {{e}}", 2);
/// assert_eq!(spans.len(), 2);
/// ```
#[must_use]
pub fn find_matching_braces(text: &str, width: usize) -> Vec<Span> {
    let mut candidates: Vec<Span> = brace_spans(text)
        .into_iter()
        .filter(|s| s.width == width)
        .map(|s| s.span)
        .collect();
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut outermost: Vec<Span> = Vec::with_capacity(candidates.len());
    for span in candidates {
        match outermost.last() {
            Some(last) if last.contains(&span) => {}
            _ => outermost.push(span),
        }
    }
    outermost
}

/// Split `text` on `sep`, treating `{{...}}` and `[[...]]` as opaque.
///
/// Nesting is tracked with a single counter incremented on `{{` / `[[` and
/// decremented on `}}` / `]]`; a stray closer never drives it below zero.
/// The final part is always emitted, so `"a|"` yields `["a", ""]`.
#[must_use]
pub fn split_top_level(text: &str, sep: char) -> Vec<String> {
    debug_assert!(sep.is_ascii(), "separator must be a single ASCII character");
    let sep = sep as u8;
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes.get(i..i + 2) {
            Some(b"{{") | Some(b"[[") => {
                depth += 1;
                i += 2;
                continue;
            }
            Some(b"}}") | Some(b"]]") => {
                depth = depth.saturating_sub(1);
                i += 2;
                continue;
            }
            _ => {}
        }
        if bytes[i] == sep && depth == 0 {
            parts.push(text[last..i].to_string());
            last = i + 1;
        }
        i += 1;
    }
    parts.push(text[last..].to_string());
    parts
}

fn find_from(re: &Regex, text: &str, from: usize) -> Option<Span> {
    re.find_at(text, from).map(|m| Span::new(m.start(), m.end())).filter(|s| !s.is_empty())
}

/// Remove every balanced region delimited by the `open` / `close` patterns.
///
/// Regions may nest and interleave. When an opener appears before the current
/// region closes, nesting is extended rather than closing early. When closers
/// run out before nesting returns to zero, the malformed remainder collapses
/// into one span from the first opener to the last closer found.
#[must_use]
pub fn drop_nested(text: &str, open: &Regex, close: &Regex) -> String {
    let Some(mut start) = find_from(open, text, 0) else {
        return text.to_string();
    };
    let mut spans: Vec<Span> = Vec::new();
    let mut nest = 0usize;
    let mut end = find_from(close, text, start.end);
    let mut next = start;

    while let Some(mut current_end) = end {
        let Some(found) = find_from(open, text, next.end) else {
            // no more openers: close whatever is still pending
            while nest > 0 {
                nest -= 1;
                match find_from(close, text, current_end.end) {
                    Some(more) => current_end = more,
                    None => break,
                }
            }
            spans.push(Span::new(start.start, current_end.end));
            break;
        };
        next = found;

        let mut pending = Some(current_end);
        while let Some(closer) = pending {
            if closer.end >= next.start {
                break;
            }
            if nest > 0 {
                nest -= 1;
                pending = find_from(close, text, closer.end);
                if pending.is_none() {
                    let from = spans.first().map_or(start.start, |s| s.start);
                    spans = vec![Span::new(from, closer.end)];
                }
            } else {
                spans.push(Span::new(start.start, closer.end));
                start = next;
                pending = find_from(close, text, next.end);
                break;
            }
        }
        end = pending;

        if next != start {
            nest += 1;
        }
    }

    drop_spans(spans, text)
}

/// Convenience wrapper around [`drop_nested`] for literal delimiters.
#[must_use]
pub fn drop_nested_literal(text: &str, open: &str, close: &str) -> String {
    match (Regex::new(&regex::escape(open)), Regex::new(&regex::escape(close))) {
        (Ok(open), Ok(close)) => drop_nested(text, &open, &close),
        _ => text.to_string(),
    }
}

/// Delete the given spans from `text` in one left-to-right sweep.
///
/// Spans nested inside an already-deleted span are ignored; no offset is
/// ever visited twice.
#[must_use]
pub fn drop_spans(mut spans: Vec<Span>, text: &str) -> String {
    spans.sort();
    let mut result = String::with_capacity(text.len());
    let mut offset = 0;
    for span in spans {
        if offset <= span.start {
            result.push_str(&text[offset..span.start]);
            offset = span.end;
        }
    }
    result.push_str(&text[offset..]);
    result
}

/// Pad `s` with enough `{` / `}` to balance every dangling brace.
///
/// Unmatched closers are balanced by leading `{`, unmatched openers by
/// trailing `}`. Applying the function twice yields the same result as
/// applying it once.
#[must_use]
pub fn balance_brackets(s: &str) -> String {
    let mut unmatched_open = 0usize;
    let mut unmatched_close = 0usize;
    for c in s.chars() {
        match c {
            '{' => unmatched_open += 1,
            '}' if unmatched_open > 0 => unmatched_open -= 1,
            '}' => unmatched_close += 1,
            _ => {}
        }
    }
    if unmatched_open == 0 && unmatched_close == 0 {
        return s.to_string();
    }

    let mut balanced = String::with_capacity(s.len() + unmatched_open + unmatched_close);
    balanced.extend(std::iter::repeat_n('{', unmatched_close));
    balanced.push_str(s);
    balanced.extend(std::iter::repeat_n('}', unmatched_open));
    balanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slices<'a>(text: &'a str, spans: &[Span]) -> Vec<&'a str> {
        spans.iter().map(|s| &text[s.start..s.end]).collect()
    }

    #[test]
    fn test_find_top_level_templates() {
        let text = "a {{b|{{c}}}} d {{e}}";
        let spans = find_matching_braces(text, 2);
        assert_eq!(slices(text, &spans), vec!["{{b|{{c}}}}", "{{e}}"]);
    }

    #[test]
    fn test_find_template_arguments() {
        let text = "x{{{1|{{{2|d}}}}}}y{{{name}}}";
        let spans = find_matching_braces(text, 3);
        assert_eq!(slices(text, &spans), vec!["{{{1|{{{2|d}}}}}}", "{{{name}}}"]);
    }

    #[test]
    fn test_argument_inside_template_is_found() {
        let text = "{{foo|{{{1}}}}}";
        assert_eq!(slices(text, &find_matching_braces(text, 3)), vec!["{{{1}}}"]);
        assert_eq!(slices(text, &find_matching_braces(text, 2)), vec!["{{foo|{{{1}}}}}"]);
    }

    #[test]
    fn test_five_brace_run_is_template_around_argument() {
        let text = "{{{{{x}}}}}";
        assert_eq!(slices(text, &find_matching_braces(text, 2)), vec!["{{{{{x}}}}}"]);
        assert_eq!(slices(text, &find_matching_braces(text, 3)), vec!["{{{x}}}"]);
    }

    #[test]
    fn test_four_brace_run_leaves_single_brace() {
        let text = "{{{{x}}}}";
        assert_eq!(slices(text, &find_matching_braces(text, 3)), vec!["{{{x}}}"]);
        assert!(find_matching_braces(text, 2).is_empty());
    }

    #[test]
    fn test_unbalanced_opener_yields_no_span() {
        let text = "{{open {{closed}}";
        assert_eq!(slices(text, &find_matching_braces(text, 2)), vec!["{{closed}}"]);
        assert!(find_matching_braces("only {{ opener", 2).is_empty());
        assert!(find_matching_braces("only }} closer", 2).is_empty());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a|b|c", '|'), vec!["a", "b", "c"]);
        assert_eq!(split_top_level("t|{{x|y}}|[[l|m]]", '|'), vec!["t", "{{x|y}}", "[[l|m]]"]);
        assert_eq!(split_top_level("a||", '|'), vec!["a", "", ""]);
        assert_eq!(split_top_level("", '|'), vec![""]);
    }

    #[test]
    fn test_split_survives_stray_closer() {
        assert_eq!(split_top_level("a}}|b", '|'), vec!["a}}", "b"]);
    }

    #[test]
    fn test_drop_nested_simple_and_nested() {
        assert_eq!(drop_nested_literal("a{|t|}b", "{|", "|}"), "ab");
        assert_eq!(drop_nested_literal("a{{x{{y}}z}}b{{w}}c", "{{", "}}"), "abc");
    }

    #[test]
    fn test_drop_nested_unbalanced_collapses() {
        // the second opener never closes: the region extends to the last closer
        assert_eq!(drop_nested_literal("a{{x{{y}}b", "{{", "}}"), "ab");
        assert_eq!(drop_nested_literal("no delimiters", "{{", "}}"), "no delimiters");
        assert_eq!(drop_nested_literal("open {{ only", "{{", "}}"), "open {{ only");
    }

    #[test]
    fn test_drop_nested_with_patterns() {
        let open = Regex::new(r"(?i)<\s*ref\b[^>/]*>").unwrap();
        let close = Regex::new(r"(?i)<\s*/\s*ref>").unwrap();
        let text = "Fact<ref name=a>cite <ref>inner</ref></ref> more.";
        assert_eq!(drop_nested(text, &open, &close), "Fact more.");
    }

    #[test]
    fn test_drop_spans_ignores_nested_spans() {
        let spans = vec![Span::new(1, 5), Span::new(2, 3), Span::new(6, 7)];
        assert_eq!(drop_spans(spans, "abcdefgh"), "afh");
    }

    #[test]
    fn test_balance_brackets() {
        assert_eq!(balance_brackets("a}}b"), "{{a}}b");
        assert_eq!(balance_brackets("{{a"), "{{a}}");
        assert_eq!(balance_brackets("}{"), "{}{}");
        assert_eq!(balance_brackets("{{ok}}"), "{{ok}}");
    }

    proptest! {
        #[test]
        fn prop_balance_brackets_is_idempotent(s in "[a{}|]{0,24}") {
            let once = balance_brackets(&s);
            prop_assert_eq!(balance_brackets(&once), once);
        }

        #[test]
        fn prop_brace_spans_never_cross(s in "[x{}|]{0,32}") {
            let spans: Vec<Span> = brace_spans(&s).into_iter().map(|b| b.span).collect();
            for a in &spans {
                prop_assert!(a.start < a.end);
                for b in &spans {
                    let disjoint = a.end <= b.start || b.end <= a.start;
                    prop_assert!(disjoint || a.contains(b) || b.contains(a));
                }
            }
        }
    }
}
