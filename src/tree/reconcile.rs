//! Change reconciliation: carry fragments across an edit.
//!
//! A fragment survives an edit when none of the changed ranges overlaps or
//! touches it in the old document; it then moves by the net length change
//! of the ranges before it. A pure insertion right at a fragment's start
//! only moves it. A fragment hit by a change is broken into its
//! child nodes, which are tried in turn. Nothing that intersects a change
//! is ever kept, even partially; re-deriving node boundaries around an
//! edit is the parser's job.

use rowan::{GreenNodeData, NodeOrToken};
use text_size::TextSize;

use super::TreeFragment;
use crate::base::{ChangedRange, shift};

#[derive(Debug, Default)]
struct Tally {
    kept: usize,
    split: usize,
}

impl TreeFragment {
    /// Map `fragments` through one edit's changed ranges.
    ///
    /// `changes` must be sorted and non-overlapping; this is checked in
    /// debug builds only.
    pub fn apply_changes(fragments: &[TreeFragment], changes: &[ChangedRange]) -> Vec<TreeFragment> {
        debug_assert!(
            ChangedRange::validate(changes).is_ok(),
            "changed ranges must be sorted and non-overlapping: {changes:?}"
        );
        if changes.is_empty() {
            return fragments.to_vec();
        }

        let mut result = Vec::with_capacity(fragments.len());
        let mut tally = Tally::default();
        for fragment in fragments {
            place(fragment.node(), fragment.start(), changes, &mut result, &mut tally);
        }

        tracing::debug!(
            before = fragments.len(),
            after = result.len(),
            kept = tally.kept,
            split = tally.split,
            changes = changes.len(),
            "reconciled tree fragments"
        );
        result
    }
}

fn place(
    node: &GreenNodeData,
    start: TextSize,
    changes: &[ChangedRange],
    out: &mut Vec<TreeFragment>,
    tally: &mut Tally,
) {
    let end = start + node.text_len();
    let mut delta = 0i64;
    for change in changes {
        if change.to_old < start || (change.to_old == start && change.from_old == start) {
            delta += change.len_delta();
            continue;
        }
        if change.from_old > end {
            break;
        }

        // Overlapping or touching: try the children instead.
        tally.split += 1;
        let mut offset = start;
        for child in node.children() {
            match child {
                NodeOrToken::Node(child) => {
                    if child.text_len() > TextSize::new(0) {
                        place(child, offset, changes, out, tally);
                    }
                    offset += child.text_len();
                }
                NodeOrToken::Token(token) => offset += token.text_len(),
            }
        }
        return;
    }

    tally.kept += 1;
    out.push(TreeFragment::new(node.to_owned(), shift(start, delta)));
}
