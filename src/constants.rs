//! Global constants used throughout the wikiextract codebase.
//!
//! This module contains recursion ceilings, fixed markers, and other
//! values that are shared across the expansion core, the formatter and
//! the command-line surface. Defining them centrally keeps the magic
//! numbers of the expansion algorithm discoverable.

/// Maximum number of nested template frames before the outer expansion loop
/// gives up and discards the document (30 frames).
///
/// This is the primary recursion signal: every successful template invocation
/// pushes a frame, so self-referential templates hit this ceiling first.
pub const MAX_TEMPLATE_RECURSION_LEVELS: usize = 30;

/// Maximum number of nested single-template invocations (60 levels).
///
/// Invocations that never push a frame (parser functions, magic words,
/// pseudo-templates nested inside each other) are bounded by this ceiling.
/// Hitting it degrades the invocation to an empty string.
pub const MAX_INVOCATION_DEPTH: usize = 60;

/// Maximum depth of parameter substitution inside one template body (16 levels).
pub const MAX_PARAMETER_RECURSION_LEVELS: usize = 16;

/// Maximum number of invocations expanded for one document (50,000).
///
/// Branching templates can stay under every depth ceiling while still
/// multiplying work at each level. Past this budget every further invocation
/// expands to an empty string.
pub const MAX_EXPANSIONS: usize = 50_000;

/// Placeholder nesting at which parsing stops and keeps the rest as literal text.
pub const MAX_PLACEHOLDER_NESTING: usize = 64;

/// Parenthesis and prefix-operator nesting accepted by `#expr`.
pub const MAX_EXPR_NESTING: usize = 100;

/// Marker returned by `#expr` when an expression cannot be evaluated.
///
/// The `#iferror` parser function recognises this marker.
pub const EXPR_ERROR_MARKER: &str = "<span class=\"error\"></span>";

/// Default namespace used to qualify bare template titles.
pub const DEFAULT_TEMPLATE_NAMESPACE: &str = "Template";

/// Degree, minute and second suffixes used when formatting coordinates.
pub const COORD_COMPONENT_SUFFIXES: [&str; 3] = ["º", "'", "''"];

/// Prefix of the century pseudo-template and the word emitted before the numeral.
pub const CENTURY_TEMPLATE: &str = "segle";

/// Suffix appended to a century before the common era.
pub const CENTURY_BCE_SUFFIX: &str = " aC";

/// Separator written between documents in plain-text output.
pub const FILE_SEPARATOR: &str = "\n";

/// Default number of documents processed concurrently by the CLI.
pub const DEFAULT_MAX_PARALLEL: usize = 4;
