//! Parsed template bodies.
//!
//! A template body is a sequence of literal text and `{{{...}}}` placeholders.
//! The name and the default of a placeholder are themselves templates, because
//! both may embed further placeholders or invocations:
//!
//! ```text
//! {{{text|{{{quote|{{{1|none}}}}}}}}}
//! {{{appointe{{#if:{{{appointer14|}}}|r|d}}14|}}}
//! ```
//!
//! Parsing happens once per title and document; substitution runs on every
//! invocation against that invocation's [`ParameterTable`].

use crate::constants::MAX_PLACEHOLDER_NESTING;
use crate::core::Discard;
use crate::scanner::{find_matching_braces, split_top_level};
use crate::templating::params::ParameterTable;

/// The services substitution needs from the surrounding expansion engine.
pub trait ArgumentExpander {
    /// Expand every invocation in `text`.
    fn expand_text(&mut self, text: &str) -> Result<String, Discard>;

    /// Maximum placeholder nesting before substitution degrades to empty text.
    fn parameter_depth_limit(&self) -> usize;

    /// Record that the placeholder nesting limit was hit.
    fn record_parameter_overflow(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Literal(String),
    Placeholder(TemplateArg),
}

/// A `{{{name|default}}}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateArg {
    pub name: Template,
    pub default: Option<Template>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<TemplateNode>,
}

impl Template {
    /// Parse `body` into literals and placeholders.
    ///
    /// Unbalanced triple braces stay literal text, and so does anything
    /// nested deeper than [`MAX_PLACEHOLDER_NESTING`] placeholders.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        Self::parse_nested(body, 0)
    }

    fn parse_nested(body: &str, depth: usize) -> Self {
        if depth >= MAX_PLACEHOLDER_NESTING {
            return Self {
                nodes: vec![TemplateNode::Literal(body.to_string())],
            };
        }

        let mut nodes = Vec::new();
        let mut cursor = 0;

        for span in find_matching_braces(body, 3) {
            if span.start > cursor {
                nodes.push(TemplateNode::Literal(body[cursor..span.start].to_string()));
            }
            nodes.push(TemplateNode::Placeholder(TemplateArg::parse_nested(
                &body[span.start + 3..span.end - 3],
                depth + 1,
            )));
            cursor = span.end;
        }
        if cursor < body.len() {
            nodes.push(TemplateNode::Literal(body[cursor..].to_string()));
        }

        Self {
            nodes,
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// Replace every placeholder with its bound value.
    pub fn substitute(
        &self,
        params: &ParameterTable,
        engine: &mut dyn ArgumentExpander,
        depth: usize,
    ) -> Result<String, Discard> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                TemplateNode::Literal(text) => out.push_str(text),
                TemplateNode::Placeholder(arg) => {
                    out.push_str(&arg.substitute(params, engine, depth)?);
                }
            }
        }
        Ok(out)
    }
}

impl TemplateArg {
    /// Parse the interior of a `{{{...}}}` span. Parts after the default are ignored.
    #[must_use]
    pub fn parse(interior: &str) -> Self {
        Self::parse_nested(interior, 0)
    }

    fn parse_nested(interior: &str, depth: usize) -> Self {
        let mut parts = split_top_level(interior, '|').into_iter();
        let name = Template::parse_nested(parts.next().as_deref().unwrap_or_default(), depth);
        let default = parts.next().map(|d| Template::parse_nested(&d, depth));
        Self {
            name,
            default,
        }
    }

    /// Resolve this placeholder against `params`.
    ///
    /// The name is substituted and expanded first; a bound value is returned
    /// as is, otherwise the default is substituted and expanded, otherwise the
    /// placeholder vanishes.
    pub fn substitute(
        &self,
        params: &ParameterTable,
        engine: &mut dyn ArgumentExpander,
        depth: usize,
    ) -> Result<String, Discard> {
        if depth > engine.parameter_depth_limit() {
            engine.record_parameter_overflow();
            tracing::debug!("placeholder nesting exceeds {}", engine.parameter_depth_limit());
            return Ok(String::new());
        }

        let name = self.name.substitute(params, engine, depth + 1)?;
        let name = engine.expand_text(&name)?;

        if let Some(value) = params.get(name.trim()) {
            return Ok(value.to_string());
        }
        match &self.default {
            Some(default) => {
                let value = default.substitute(params, engine, depth + 1)?;
                engine.expand_text(&value)
            }
            None => Ok(String::new()),
        }
    }
}
