//! Rope-backed document snapshots.

use std::fmt;

use ropey::Rope;
use text_size::{TextRange, TextSize};

use crate::base::{ChangedRange, TextEdit, shift};

/// One immutable version of a document.
///
/// Cloning is O(1); the rope shares its nodes between clones. Offsets are
/// UTF-8 byte positions.
#[derive(Clone, Default)]
pub struct Document {
    rope: Rope,
}

/// A committed edit: the document it produced and the ranges it changed.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub document: Document,
    pub changes: Vec<ChangedRange>,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn from_rope(rope: Rope) -> Self {
        Self { rope }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn len(&self) -> TextSize {
        TextSize::new(self.rope.len_bytes() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// The rope chunk containing `pos`, and the offset that chunk starts at.
    ///
    /// `pos == len` yields the last chunk.
    pub fn chunk_at(&self, pos: usize) -> (&str, usize) {
        let (chunk, start, _, _) = self.rope.chunk_at_byte(pos);
        (chunk, start)
    }

    /// Copy out the text of `range`.
    pub fn slice(&self, range: TextRange) -> String {
        let start = usize::from(range.start());
        let end = usize::from(range.end()).min(self.rope.len_bytes());
        if start >= end {
            return String::new();
        }
        self.rope.byte_slice(start..end).to_string()
    }

    /// Apply a batch of edits, producing the new document and its changed
    /// ranges.
    ///
    /// Edits are expressed against this document and must be sorted and
    /// non-overlapping.
    pub fn apply_edits(&self, edits: &[TextEdit]) -> DocumentChange {
        let mut changes = Vec::with_capacity(edits.len());
        let mut delta = 0i64;
        for edit in edits {
            let from_new = shift(edit.range.start(), delta);
            changes.push(ChangedRange::new(
                edit.range.start(),
                edit.range.end(),
                from_new,
                from_new + edit.insert_len(),
            ));
            delta += edit.len_delta();
        }
        debug_assert!(
            ChangedRange::validate_within(
                &changes,
                self.len(),
                shift(self.len(), delta)
            )
            .is_ok(),
            "edits must be sorted, non-overlapping and inside the document"
        );

        let mut rope = self.rope.clone();
        for edit in edits.iter().rev() {
            let start = rope.byte_to_char(usize::from(edit.range.start()));
            let end = rope.byte_to_char(usize::from(edit.range.end()));
            if start < end {
                rope.remove(start..end);
            }
            if !edit.new_text.is_empty() {
                rope.insert(start, &edit.new_text);
            }
        }

        DocumentChange {
            document: Document { rope },
            changes,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.rope, f)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.rope.len_bytes())
            .finish()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}
