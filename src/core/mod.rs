//! Core types shared by every layer of wikiextract.
//!
//! - [`Discard`] / [`DiscardCause`] - the document-level discard signal raised by
//!   template expansion
//! - [`WikiError`] - typed failures of the extraction surface
//! - [`ErrorContext`] / [`user_friendly_error`] - colored terminal reporting

pub mod error;

pub use error::{Discard, DiscardCause, ErrorContext, WikiError, user_friendly_error};
