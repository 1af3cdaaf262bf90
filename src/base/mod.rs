//! Foundation types for the reweave core.
//!
//! This module provides the primitives every other layer builds on:
//! - [`TextRange`], [`TextSize`] - Source positions (UTF-8 byte offsets)
//! - [`ChangedRange`] - One contiguous edit mapped from old to new document
//! - [`TextEdit`] - A replacement request against a document
//! - [`WorkConfig`] - Time budgets for synchronous and background parsing
//! - [`ChangeError`], [`NotReady`] - Error types
//!
//! This module has NO dependencies on other reweave modules.

mod changes;
mod config;
mod edit;
mod error;

pub use changes::ChangedRange;
pub(crate) use changes::shift;
pub use config::WorkConfig;
pub use edit::TextEdit;
pub use error::{ChangeError, NotReady};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
