//! Document text and the cursor the parser reads it through.
//!
//! - [`Document`] - An immutable, cheaply cloned rope snapshot of one
//!   document version
//! - [`TextCursor`] - Random-access, sequentially optimized reader with a
//!   two-chunk cache

mod cursor;
mod document;

pub use cursor::{CursorStats, TextCursor};
pub use document::{Document, DocumentChange};
