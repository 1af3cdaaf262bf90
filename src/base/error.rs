//! Error types for the reweave core.
//!
//! Running out of time budget is not an error anywhere in the crate; it is
//! reported as a `false`/`None` outcome. These types only describe caller
//! contract violations and synchronous catch-up timeouts.

use std::time::Duration;

use text_size::TextSize;
use thiserror::Error;

/// A malformed changed-range list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// A range ends before it starts.
    #[error("changed range {index} is inverted")]
    Inverted { index: usize },

    /// A range starts before its predecessor.
    #[error("changed range {index} is not in ascending order")]
    Unsorted { index: usize },

    /// A range overlaps its predecessor.
    #[error("changed range {index} overlaps the previous range")]
    Overlapping { index: usize },

    /// A range reaches past the end of its document.
    #[error("changed range {index} lies outside the document")]
    OutOfBounds { index: usize },
}

/// The tree could not be brought up to `up_to` within `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("syntax tree not available up to position {up_to:?} within {timeout:?}")]
pub struct NotReady {
    pub up_to: TextSize,
    pub timeout: Duration,
}
