//! `<math>` formulas rendered as readable inline text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static MATH_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?s)<math(\s[^>]*)?>(.+?)</math\s*>").unwrap(),
        Regex::new(r"(?s)&lt;math(\s[^&]*?)?&gt;(.+?)&lt;/math&gt;").unwrap(),
        Regex::new(r"\{\{#tag:math()\|([^}]+)\}\}").unwrap(),
    ]
});

static LATEX_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\\{}^_$|∑∏∫≤≥≠∞α-ωΑ-Ω]|frac|sum|prod|int|sqrt|begin|end").unwrap()
});

static DISPLAY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)display\s*=\s*["']?block["']?"#).unwrap());

static ALIGNED_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{(?:align|cases|array|matrix)").unwrap());

static ALIGNMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*&\s*").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\\+").unwrap());
static OPERATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([=<>≤≥≠±∓])").unwrap());

const SYMBOLS: &[(&str, &str)] = &[
    ("infty", "∞"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("leq", "≤"),
    ("geq", "≥"),
    ("neq", "≠"),
    ("approx", "≈"),
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("pi", "π"),
    ("sigma", "σ"),
    ("phi", "φ"),
    ("omega", "ω"),
    ("Omega", "Ω"),
    ("Delta", "Δ"),
    ("Gamma", "Γ"),
    ("Theta", "Θ"),
];

static SYMBOL_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SYMBOLS
        .iter()
        .map(|(name, symbol)| (Regex::new(&format!(r"\\{name}\b")).unwrap(), *symbol))
        .collect()
});

fn clean_latex(latex: &str) -> String {
    let mut cleaned = if ALIGNED_ENV.is_match(latex) {
        latex.to_string()
    } else {
        ALIGNMENT.replace_all(latex, " ").into_owned()
    };
    cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();
    cleaned = LINE_BREAKS.replace_all(&cleaned, r"\\").into_owned();
    cleaned = OPERATORS.replace_all(&cleaned, " ${1} ").into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").into_owned();
    for (pattern, symbol) in SYMBOL_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, *symbol).into_owned();
    }
    cleaned.trim().to_string()
}

fn render(caps: &Captures<'_>) -> String {
    let content = caps.get(2).map_or("", |m| m.as_str()).trim();
    if !LATEX_MARKERS.is_match(content) {
        return format!(" {content} ");
    }
    let display = caps.get(1).is_some_and(|attrs| DISPLAY_BLOCK.is_match(attrs.as_str()));
    let cleaned = clean_latex(content);
    if display { format!("\n\n$$ {cleaned} $$\n\n") } else { format!(" $ {cleaned} $ ") }
}

/// Replace `<math>` elements (also escaped, or written as `{{#tag:math|...}}`)
/// with `$ ... $` inline formulas, or `$$ ... $$` blocks for `display="block"`.
#[must_use]
pub fn clean_math(text: &str) -> String {
    let mut text = text.to_string();
    for pattern in MATH_PATTERNS.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, render).into_owned();
        }
    }
    text
}
