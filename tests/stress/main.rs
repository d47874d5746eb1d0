//! Stress test suite for wikiextract
//!
//! Adversarial inputs that must terminate within the recursion ceilings and
//! the expansion budget: self-referential and branching templates, deeply
//! nested invocations, placeholders and expressions, and unbalanced brace
//! soup. Timings are printed for manual review rather than asserted.
//!
//! # Running Stress Tests
//!
//! ```bash
//! cargo test --test stress -- --nocapture
//! ```

mod termination;
