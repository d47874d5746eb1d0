//! Integration test suite for wikiextract
//!
//! End-to-end tests of the expansion core, the formatter, the whole
//! extraction pipeline and the command-line binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **expansion**: template expansion, discard propagation, parser functions
//! - **formatter**: sections, lists and residual-line handling
//! - **pipeline**: raw wikitext to output blocks and serialized documents
//! - **cli**: the `wikiextract` binary

mod cli;
mod expansion;
mod formatter;
mod pipeline;
