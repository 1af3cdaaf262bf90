//! Published syntax trees and the fragments reused across edits.
//!
//! Trees are rowan green nodes: immutable, structurally comparable, and
//! tagged with the length of source they cover. The core never looks at
//! node kinds itself; those belong to whichever [`Parser`](crate::parser::Parser)
//! produced the tree.

mod fragment;
mod reconcile;

use std::fmt;

use rowan::{GreenNode, NodeOrToken};
use text_size::TextSize;

pub use fragment::TreeFragment;

/// Kind-agnostic rowan language for walking any published tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RawLanguage {}

impl rowan::Language for RawLanguage {
    type Kind = rowan::SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind
    }
}

/// A red node over a published tree, with parent pointers.
pub type TreeNode = rowan::SyntaxNode<RawLanguage>;

/// An immutable syntax tree covering a prefix of its document.
///
/// A tree whose length equals the document length is complete.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Tree {
    green: GreenNode,
}

impl Tree {
    /// Kind of the root of [`Tree::empty`].
    pub const EMPTY_KIND: rowan::SyntaxKind = rowan::SyntaxKind(u16::MAX);

    pub fn new(green: GreenNode) -> Self {
        Self { green }
    }

    /// A tree covering nothing.
    pub fn empty() -> Self {
        Self::new(GreenNode::new(Self::EMPTY_KIND, Vec::new()))
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn kind(&self) -> rowan::SyntaxKind {
        self.green.kind()
    }

    /// Number of source bytes the tree covers.
    pub fn len(&self) -> TextSize {
        self.green.text_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == TextSize::new(0)
    }

    /// Root of a fresh red tree for navigation.
    pub fn root(&self) -> TreeNode {
        TreeNode::new_root(self.green.clone())
    }

    /// Source text the tree was built from.
    pub fn text(&self) -> String {
        self.root().text().to_string()
    }

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        fn count(node: &rowan::GreenNodeData) -> usize {
            1 + node
                .children()
                .map(|child| match child {
                    NodeOrToken::Node(node) => count(node),
                    NodeOrToken::Token(_) => 0,
                })
                .sum::<usize>()
        }
        count(&self.green)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#?}", self.root())
        } else {
            f.debug_struct("Tree")
                .field("kind", &self.kind())
                .field("len", &self.len())
                .finish()
        }
    }
}
