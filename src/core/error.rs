//! Error handling for wikiextract
//!
//! Two kinds of failure exist in this crate and they are kept
//! apart:
//!
//! - [`Discard`] - the in-band signal raised by the expansion core when a
//!   document must be dropped (a configured discard template was invoked or
//!   the template frame ceiling was hit). It is not an error from the user's
//!   point of view; the extractor logs it and moves on to the next document.
//! - [`WikiError`] - genuine failures of the outer surface: unreadable input,
//!   a bad configuration file, an invalid pattern, output that cannot be
//!   written.
//!
//! Everything above the expansion core uses `anyhow::Result` and converts to a
//! [`ErrorContext`] through [`user_friendly_error`] right before printing.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wikiextract::core::{ErrorContext, WikiError};
//!
//! let context = ErrorContext::new(WikiError::InputNotFound {
//!     path: "dump.wiki".to_string(),
//! })
//! .with_suggestion("Check the path passed to 'wikiextract extract'");
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Why a document was dropped during expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardCause {
    /// A template listed in `discard_templates` (or a title that resolves to
    /// one) was invoked.
    Template,
    /// The nesting of template frames reached the configured ceiling.
    RecursionLimit {
        depth: usize,
    },
}

/// Signal propagated out of template expansion when the whole document must
/// be thrown away.
///
/// Returned as the `Err` side of `Result<String, Discard>` by every expansion
/// operation so that `?` carries it unchanged to the document boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("document discarded while expanding '{template}'")]
pub struct Discard {
    /// Title of the template being expanded when the signal was raised.
    pub template: String,
    pub cause: DiscardCause,
}

impl Discard {
    pub fn template(name: impl Into<String>) -> Self {
        Self {
            template: name.into(),
            cause: DiscardCause::Template,
        }
    }

    pub fn recursion_limit(name: impl Into<String>, depth: usize) -> Self {
        Self {
            template: name.into(),
            cause: DiscardCause::RecursionLimit {
                depth,
            },
        }
    }
}

/// Failures of the extraction surface.
#[derive(Error, Debug)]
pub enum WikiError {
    /// An input file given on the command line does not exist
    #[error("Input file not found: {path}")]
    InputNotFound {
        path: String,
    },

    /// The template directory could not be loaded
    #[error("Failed to load templates from {path}: {reason}")]
    TemplateStoreError {
        path: String,
        reason: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// The configuration file is not valid TOML or has wrong field types
    #[error("Invalid configuration file {file}: {reason}")]
    ConfigParseError {
        file: String,
        reason: String,
    },

    /// A user-supplied regular expression failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    /// Writing extracted output failed
    #[error("Failed to write output to {path}: {reason}")]
    OutputError {
        path: String,
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        message: String,
    },
}

/// A [`WikiError`] paired with optional details and a suggested fix.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: WikiError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: WikiError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add background details, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] suitable for the terminal.
///
/// Known error types get tailored suggestions; anything else is reported
/// with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<WikiError>() {
        Ok(wiki_error) => return create_error_context(wiki_error),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(WikiError::Other {
                    message: chain_message(&error),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details("A required file or directory could not be found");
            }
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(WikiError::Other {
                    message: chain_message(&error),
                })
                .with_suggestion("Check file ownership and permissions of the input and output paths");
            }
            std::io::ErrorKind::InvalidData => {
                return ErrorContext::new(WikiError::Other {
                    message: chain_message(&error),
                })
                .with_suggestion("Input files must be UTF-8 encoded wikitext")
                .with_details("The file contains bytes that are not valid UTF-8");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(WikiError::ConfigParseError {
            file: "config.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Run 'wikiextract config show' to see the expected layout")
        .with_details("TOML parsing errors are usually caused by missing quotes or mismatched brackets");
    }

    ErrorContext::new(WikiError::Other {
        message: chain_message(&error),
    })
}

fn chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: WikiError) -> ErrorContext {
    match &error {
        WikiError::InputNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the input paths; each input file holds one document"),

        WikiError::TemplateStoreError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass a directory of template files with --templates, one file per template")
            .with_details("File stems map to titles: 'Infobox_person.wiki' defines 'Template:Infobox person'"),

        WikiError::ConfigError {
            ..
        }
        | WikiError::ConfigParseError {
            ..
        }
        | WikiError::TomlError(_) => ErrorContext::new(error)
            .with_suggestion("Run 'wikiextract config show' to print the effective configuration"),

        WikiError::InvalidPattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Patterns use Rust regex syntax; escape literal '.', '(' and '|' characters"),

        WikiError::OutputError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the output directory exists and is writable"),

        _ => ErrorContext::new(error),
    }
}
