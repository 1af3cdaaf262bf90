//! Reusable pieces of previously published trees.

use rowan::{GreenNode, GreenNodeData, NodeOrToken};
use text_size::{TextRange, TextSize};

use super::Tree;

/// A node from an earlier tree, positioned where it is still valid in the
/// current document.
///
/// Fragment lists are kept sorted by position and never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFragment {
    node: GreenNode,
    start: TextSize,
}

impl TreeFragment {
    pub fn new(node: GreenNode, start: TextSize) -> Self {
        Self { node, start }
    }

    pub fn node(&self) -> &GreenNode {
        &self.node
    }

    pub fn kind(&self) -> rowan::SyntaxKind {
        self.node.kind()
    }

    pub fn start(&self) -> TextSize {
        self.start
    }

    pub fn end(&self) -> TextSize {
        self.start + self.node.text_len()
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(self.start, self.node.text_len())
    }

    /// Split a tree into fragments, one per non-empty top-level node.
    ///
    /// A `partial` tree came from a forced finish, so its last node may
    /// have been cut short and is left out.
    pub fn of_tree(tree: &Tree, partial: bool) -> Vec<TreeFragment> {
        let mut fragments = Vec::new();
        push_children(tree.green(), TextSize::new(0), &mut fragments);
        if partial {
            fragments.pop();
        }
        fragments
    }

    /// Fold a newly published tree into an existing fragment list.
    ///
    /// The tree's own fragments replace everything it covers; older
    /// fragments past its end are kept.
    pub fn add_tree(tree: &Tree, fragments: &[TreeFragment], partial: bool) -> Vec<TreeFragment> {
        let mut result = Self::of_tree(tree, partial);
        let covered = tree.len();
        result.extend(
            fragments
                .iter()
                .filter(|fragment| fragment.start >= covered)
                .cloned(),
        );
        result
    }
}

/// Append the non-empty child nodes of `node`, which starts at `start`.
/// Tokens and zero-length recovery nodes are never reused.
pub(super) fn push_children(node: &GreenNodeData, start: TextSize, out: &mut Vec<TreeFragment>) {
    let mut offset = start;
    for child in node.children() {
        match child {
            NodeOrToken::Node(child) => {
                let len = child.text_len();
                if len > TextSize::new(0) {
                    out.push(TreeFragment::new(child.to_owned(), offset));
                }
                offset += len;
            }
            NodeOrToken::Token(token) => offset += token.text_len(),
        }
    }
}
