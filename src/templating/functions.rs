//! Built-in parser functions (`{{#if:...}}`, `{{uc:...}}`, ...).
//!
//! Every function is a pure mapping from the already-split, already-expanded
//! argument list to a string. The first argument is the text between the
//! colon and the first top-level `|`. Functions never fail: malformed input
//! yields an empty string, except `#expr`, which yields
//! [`EXPR_ERROR_MARKER`] so that `#iferror` can detect it.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::EXPR_ERROR_MARKER;
use crate::templating::expr;

static ERROR_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:strong|span|p|div)\s(?:[^\s>]*\s+)*?class="(?:[^"\s>]*\s+)*?error(?:\s[^">]*)?""#)
        .unwrap()
});

/// Upper-case the first character.
#[must_use]
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character.
#[must_use]
pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn arg(args: &[String], index: usize) -> &str {
    args.get(index).map_or("", String::as_str)
}

/// Whether `name` (case-insensitive) is a parser function this module implements.
#[must_use]
pub fn is_parser_function(name: &str) -> bool {
    matches!(
        name.trim().to_lowercase().as_str(),
        "#if"
            | "#ifeq"
            | "#iferror"
            | "#ifexpr"
            | "#switch"
            | "#expr"
            | "#tag"
            | "#ifexist"
            | "#rel2abs"
            | "#language"
            | "#time"
            | "#timel"
            | "#titleparts"
            | "#invoke"
            | "lc"
            | "uc"
            | "lcfirst"
            | "ucfirst"
            | "urlencode"
            | "int"
            | "padleft"
            | "padright"
    )
}

/// Dispatch a parser function by name. Unknown names yield an empty string.
#[must_use]
pub fn call_parser_function(name: &str, args: &[String]) -> String {
    let name = name.trim().to_lowercase();
    tracing::trace!("parser function {name} with {} arguments", args.len());

    match name.as_str() {
        "#if" => sharp_if(arg(args, 0), arg(args, 1), args.get(2).map(String::as_str)),
        "#ifeq" => sharp_ifeq(arg(args, 0), arg(args, 1), arg(args, 2), arg(args, 3)),
        "#iferror" => sharp_iferror(arg(args, 0), args.get(1).map(String::as_str), args.get(2).map(String::as_str)),
        "#ifexpr" => sharp_ifexpr(arg(args, 0), arg(args, 1), arg(args, 2)),
        "#switch" => sharp_switch(arg(args, 0), args.get(1..).unwrap_or_default()),
        "#expr" => sharp_expr(arg(args, 0)),
        "lc" => arg(args, 0).to_lowercase(),
        "uc" => arg(args, 0).to_uppercase(),
        "lcfirst" => lcfirst(arg(args, 0)),
        "ucfirst" => ucfirst(arg(args, 0)),
        "urlencode" => url::form_urlencoded::byte_serialize(arg(args, 0).as_bytes()).collect(),
        "int" => arg(args, 0).trim().parse::<i64>().map(|n| n.to_string()).unwrap_or_default(),
        "padleft" => pad(arg(args, 0), arg(args, 1), args.get(2).map(String::as_str), true),
        "padright" => pad(arg(args, 0), arg(args, 1), args.get(2).map(String::as_str), false),
        // functions that need a live page graph, a clock or a module runtime
        _ => String::new(),
    }
}

/// `{{#if: test | then | else}}`
#[must_use]
pub fn sharp_if(test: &str, then: &str, otherwise: Option<&str>) -> String {
    if test.trim().is_empty() {
        otherwise.map(|s| s.trim().to_string()).unwrap_or_default()
    } else {
        then.trim().to_string()
    }
}

/// `{{#ifeq: a | b | then | else}}`; finite numeric operands compare by value.
#[must_use]
pub fn sharp_ifeq(left: &str, right: &str, then: &str, otherwise: &str) -> String {
    let (left, right) = (left.trim(), right.trim());
    let equal = left == right
        || matches!(
            (left.parse::<f64>(), right.parse::<f64>()),
            (Ok(a), Ok(b)) if a.is_finite() && b.is_finite() && a == b
        );
    if equal { then.trim().to_string() } else { otherwise.trim().to_string() }
}

/// `{{#iferror: test | then | else}}`
#[must_use]
pub fn sharp_iferror(test: &str, then: Option<&str>, otherwise: Option<&str>) -> String {
    if ERROR_MARKUP.is_match(test) {
        return then.map(|s| s.trim().to_string()).unwrap_or_default();
    }
    match otherwise {
        Some(value) => value.trim().to_string(),
        None => test.trim().to_string(),
    }
}

/// `{{#expr: expression}}`
#[must_use]
pub fn sharp_expr(expression: &str) -> String {
    match expr::eval_to_string(expression) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("#expr '{}' failed: {e}", expression.trim());
            EXPR_ERROR_MARKER.to_string()
        }
    }
}

/// `{{#ifexpr: expression | then | else}}`
#[must_use]
pub fn sharp_ifexpr(expression: &str, then: &str, otherwise: &str) -> String {
    match expr::evaluate(expression) {
        Ok(Some(value)) if value != 0.0 => then.trim().to_string(),
        Ok(_) => otherwise.trim().to_string(),
        Err(_) => EXPR_ERROR_MARKER.to_string(),
    }
}

/// `{{#switch: primary | label = value | label2 | label3 = value | #default = d | fallback}}`
///
/// - labels are compared after trimming; a case may carry several labels
///   separated by `|` when it arrives unsplit
/// - a bare label equal to `primary` falls through to the next case with a value
/// - a matched case whose value is empty also falls through
/// - `#default` is used when nothing matches; a trailing bare value overrides it
#[must_use]
pub fn sharp_switch(primary: &str, cases: &[String]) -> String {
    let primary = primary.trim();
    let mut found = false;
    let mut default: Option<String> = None;
    let mut trailing_bare: Option<&str> = None;

    for case in cases {
        match case.split_once('=') {
            Some((labels, value)) => {
                trailing_bare = None;
                let labels = labels.trim();
                let value = value.trim();
                let matched = found || labels.split('|').any(|l| l.trim() == primary);
                if matched {
                    if !value.is_empty() {
                        return value.to_string();
                    }
                    found = true;
                } else if labels == "#default" {
                    default = Some(value.to_string());
                }
            }
            None => {
                let label = case.trim();
                if label == primary {
                    found = true;
                }
                trailing_bare = Some(label);
            }
        }
    }

    trailing_bare.map(str::to_string).or(default).unwrap_or_default()
}

fn pad(text: &str, width: &str, padding: Option<&str>, left: bool) -> String {
    let Ok(width) = width.trim().parse::<usize>() else {
        return text.to_string();
    };
    let padding = match padding {
        Some(p) if !p.is_empty() => p,
        _ => "0",
    };
    let length = text.chars().count();
    if length >= width {
        return text.to_string();
    }
    let fill: String = padding.chars().cycle().take(width - length).collect();
    if left { format!("{fill}{text}") } else { format!("{text}{fill}") }
}
