//! Test utilities for wikiextract
//!
//! Shared helpers for unit and integration tests: one-time logging setup and
//! small builders for template stores and configurations.
//!
//! # Example
//!
//! ```rust,no_run
//! use wikiextract::test_utils::{init_test_logging, store_from};
//!
//! init_test_logging(None);
//! let store = store_from(&[("Greet", "Hello, {{{1}}}!")]);
//! assert_eq!(store.len(), 1);
//! ```

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::ExtractorConfig;
use crate::templating::InMemoryTemplateStore;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set that level is used;
/// otherwise logging is enabled only when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=wikiextract=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// In-memory store holding `(title, body)` pairs.
#[must_use]
pub fn store_from(templates: &[(&str, &str)]) -> InMemoryTemplateStore {
    let mut store = InMemoryTemplateStore::new();
    for (title, body) in templates {
        store.insert(title, *body);
    }
    store
}

/// Default configuration with HTML escaping off, so expected strings stay readable.
#[must_use]
pub fn plain_config() -> ExtractorConfig {
    let mut config = ExtractorConfig::default();
    config.output.html_safe = false;
    config
}
