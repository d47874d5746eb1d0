//! Template expansion for wikitext.
//!
//! A document's `{{...}}` invocations are resolved against a
//! [`TemplateStore`] by a per-document [`TemplateExpander`]. Template bodies
//! are parsed once into a [`Template`] tree of literal text and `{{{...}}}`
//! placeholders, then instantiated with a [`ParameterTable`] bound from the
//! invocation's arguments.
//!
//! # Example
//!
//! ```rust
//! use wikiextract::templating::{ExpansionSettings, InMemoryTemplateStore, TemplateExpander};
//!
//! let mut store = InMemoryTemplateStore::new();
//! store.insert("Greet", "Hello, {{{1|stranger}}}!");
//!
//! let settings = ExpansionSettings::default();
//! let mut expander = TemplateExpander::new(&store, &settings, "Example");
//! assert_eq!(expander.expand_all("{{Greet|Ada}}").unwrap(), "Hello, Ada!");
//! ```
//!
//! # Modules
//!
//! - [`ast`] - template bodies and placeholder substitution
//! - [`params`] - argument binding
//! - [`functions`], [`expr`] - parser functions and the `#expr` grammar
//! - [`builtins`] - pseudo-templates computed from their arguments
//! - [`magic_words`] - page, site and clock variables
//! - [`expander`] - the expansion coordinator
//! - [`store`], [`cache`], [`locale`] - collaborators of the coordinator

pub mod ast;
pub mod builtins;
pub mod cache;
pub mod expander;
pub mod expr;
pub mod functions;
pub mod locale;
pub mod magic_words;
pub mod params;
pub mod store;

pub use ast::{ArgumentExpander, Template, TemplateArg, TemplateNode};
pub use cache::TemplateCache;
pub use expander::{ExpansionSettings, ExpansionStats, Frame, TemplateExpander};
pub use locale::{BuiltinLocales, LocaleResolver};
pub use magic_words::MagicWords;
pub use params::ParameterTable;
pub use store::{InMemoryTemplateStore, TemplateStore, TitleResolver, transclusion_body};
