//! wikiextract - wikitext template expansion and clean-text extraction
//!
//! Turns MediaWiki markup into plain text. Templates are expanded against a
//! local template store, markup is stripped, and the remaining text is
//! arranged into paragraphs, section headers and list items.
//!
//! # Architecture Overview
//!
//! ```text
//! document ──> cleaning (comments, math)
//!          ──> templating::TemplateExpander ──(Discard)──> dropped
//!          ──> cleaning (tables, quotes, HTML, links, whitespace)
//!          ──> formatter ──> extractor::output
//! ```
//!
//! The expansion core (scanner, templating, formatter) is synchronous and
//! allocates its state per document. The CLI runs documents in parallel on
//! top of it.
//!
//! # Core Modules
//!
//! - [`scanner`] - balanced delimiter scanning and brace rebalancing
//! - [`templating`] - template AST, parameter binding, parser functions,
//!   magic words and the expansion coordinator
//! - [`cleaning`] - inline markup filters and HTML flattening
//! - [`formatter`] - section, list and paragraph structure
//! - [`extractor`] - the per-document pipeline and output serializers
//!
//! ## Supporting Modules
//!
//! - [`config`] - `config.toml` loading and defaults
//! - [`core`] - the discard signal and error types
//! - [`cli`] - command-line surface
//! - [`constants`] - recursion ceilings and fixed markers
//!
//! # Example
//!
//! ```rust
//! use wikiextract::config::ExtractorConfig;
//! use wikiextract::extractor::{Document, Extractor};
//! use wikiextract::templating::InMemoryTemplateStore;
//!
//! let mut store = InMemoryTemplateStore::new();
//! store.insert("Height", "{{{1}}} m");
//!
//! let extractor = Extractor::new(&ExtractorConfig::default()).unwrap();
//! let doc = Document::new("1", "Eiffel Tower", "The '''tower''' is {{height|330}} tall.");
//! let extraction = extractor.extract(&store, &doc);
//! assert_eq!(extraction.blocks().unwrap(), ["The tower is 330 m tall."]);
//! ```

pub mod cleaning;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod extractor;
pub mod formatter;
pub mod scanner;
pub mod templating;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
