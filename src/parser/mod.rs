//! The resumable parser interface and a reference line grammar.
//!
//! The incremental core treats parsing as an opaque, resumable computation:
//!
//! ```text
//! TextCursor + reusable TreeFragments
//!     ↓
//! Parser::start → PartialParse
//!     ↓
//! advance() × N   (one atomic step each, position never moves backward)
//!     ↓
//! Some(Tree)      or   force_finish() → Tree covering the consumed prefix
//! ```
//!
//! [`LineParser`] implements the interface for a small line-oriented
//! grammar with fenced blocks of embedded languages, using a logos lexer
//! and rowan green nodes.

mod lexer;
mod line_parser;
mod syntax_kind;

use smol_str::SmolStr;
use text_size::TextSize;

use crate::text::TextCursor;
use crate::tree::{Tree, TreeFragment, TreeNode};

pub use lexer::{Lexer, Token, tokenize};
pub use line_parser::LineParser;
pub use syntax_kind::{LineLanguage, SyntaxKind, SyntaxNode, SyntaxToken};

/// An in-flight parse that can be advanced a step at a time.
pub trait PartialParse: Send {
    /// Run one atomic step. Returns the finished tree once all input has
    /// been consumed; the handle must not be advanced after that.
    fn advance(&mut self) -> Option<Tree>;

    /// How far the parse has consumed its input. Never decreases.
    fn parsed_pos(&self) -> TextSize;

    /// A structurally valid tree for the input consumed so far, with
    /// recovery nodes marking what is missing. The handle stays usable.
    fn force_finish(&self) -> Tree;

    /// Nodes taken over from fragments instead of being parsed.
    fn reused_nodes(&self) -> usize {
        0
    }
}

/// Starts resumable parses for one language.
pub trait Parser: Send + Sync {
    /// Begin parsing `input`, reusing `fragments` where they still fit.
    fn start(&self, input: TextCursor, fragments: &[TreeFragment]) -> Box<dyn PartialParse>;

    /// The name of the nested language `node` opens, if it carries a
    /// scope marker.
    fn scope_of(&self, _node: &TreeNode) -> Option<SmolStr> {
        None
    }
}
