//! # reweave-base
//!
//! Incremental, time-sliced re-parsing of live-edited documents.
//!
//! After each edit the syntax tree is re-derived from fragments of the
//! previous one instead of from scratch, and the remaining work is cut into
//! slices that run in idle time, so the interactive thread is never blocked
//! for more than a small budget.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! language  → Language, LanguageState, LanguageHost (get_tree, ensure_tree, language_data_at)
//!   ↓
//! scheduler → Background slicing over idle or timer wake-ups
//!   ↓
//! session   → ParseSession: resumable work, take_tree, with_changes
//!   ↓
//! parser    → PartialParse/Parser traits, logos + rowan line parser
//!   ↓
//! tree      → Tree, TreeFragment, change reconciliation
//!   ↓
//! text      → Document (rope), TextCursor
//!   ↓
//! base      → Primitives (TextSize, ChangedRange, TextEdit, WorkConfig, errors)
//! ```

// ============================================================================
// MODULES (dependency order: base → text → tree → parser → session → scheduler → language)
// ============================================================================

/// Foundation types: positions, changed ranges, edits, budgets, errors
pub mod base;

/// Document text and the chunk-caching cursor parsers read through
pub mod text;

/// Syntax trees and the fragments reused across edits
pub mod tree;

/// Resumable parser interface and the reference line parser
pub mod parser;

/// Parse sessions: one resumable parse per document version
pub mod session;

/// Background scheduler and wake-up sources
pub mod scheduler;

/// Languages, per-document state, and the host entry point
pub mod language;

// Re-export foundation types
pub use base::{ChangeError, ChangedRange, NotReady, TextEdit, TextRange, TextSize, WorkConfig};

// Re-export the main entry points
pub use language::{Language, LanguageData, LanguageHost, LanguageState};
pub use parser::{LineParser, PartialParse, Parser};
pub use scheduler::{AnyWakeups, BackgroundScheduler, TreeUpdate, Wakeups};
pub use session::ParseSession;
pub use text::{Document, DocumentChange, TextCursor};
pub use tree::{Tree, TreeFragment, TreeNode};
