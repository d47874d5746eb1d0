//! Parsed-template cache for a single document.
//!
//! Each title is parsed at most once per document; the cache is owned by one
//! expander and dropped with it, so edits to the template store are always
//! visible to the next document.

use std::collections::HashMap;
use std::rc::Rc;

use crate::templating::ast::Template;

#[derive(Debug, Default)]
pub struct TemplateCache {
    /// Fully qualified title to parsed body
    cache: HashMap<String, Rc<Template>>,
    hits: usize,
    misses: usize,
}

impl TemplateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the parsed template for `title`, counting the lookup.
    pub fn get(&mut self, title: &str) -> Option<Rc<Template>> {
        if let Some(template) = self.cache.get(title) {
            self.hits += 1;
            Some(Rc::clone(template))
        } else {
            self.misses += 1;
            None
        }
    }

    pub fn insert(&mut self, title: String, template: Rc<Template>) {
        self.cache.insert(title, template);
    }

    /// `(hits, misses)`
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
