//! Binding of invocation arguments to template parameters.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

// name: everything before the first '=', without quotes or markup
static NAMED_ARGUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^ *([^='{\[]*?) *=(.*)$").unwrap());

/// Parameter values of one template invocation, keyed by name or by
/// 1-based position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterTable {
    values: HashMap<String, String>,
}

impl ParameterTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the arguments of an invocation (everything after the title).
    ///
    /// - `name=value` binds `name` (trimmed). `2=x` therefore overrides the
    ///   second positional argument.
    /// - Any other argument binds the next positional index. Only positional
    ///   arguments advance the counter.
    /// - Values are trimmed unless they contain link brackets, so that link
    ///   text stays glued to whatever follows the substitution.
    /// - A later binding of the same key replaces the earlier one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wikiextract::templating::ParameterTable;
    ///
    /// let table = ParameterTable::bind(&["a", "b", "c", "2=B"]);
    /// assert_eq!(table.get("1"), Some("a"));
    /// assert_eq!(table.get("2"), Some("B"));
    /// assert_eq!(table.get("3"), Some("c"));
    /// ```
    pub fn bind<S: AsRef<str>>(arguments: &[S]) -> Self {
        let mut table = Self::new();
        let mut position = 0usize;

        for argument in arguments {
            let argument = argument.as_ref();
            match NAMED_ARGUMENT.captures(argument) {
                Some(caps) => {
                    let name = caps.get(1).map_or("", |m| m.as_str()).trim();
                    let value = caps.get(2).map_or("", |m| m.as_str());
                    table.insert(name, trim_value(value));
                }
                None => {
                    position += 1;
                    table.insert(&position.to_string(), trim_value(argument));
                }
            }
        }

        tracing::trace!("bound {} parameters", table.len());
        table
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn trim_value(value: &str) -> &str {
    if value.contains("[[") || value.contains("]]") {
        value
    } else {
        value.trim()
    }
}
