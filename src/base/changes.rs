//! Changed ranges produced by a committed document edit.

use super::error::ChangeError;
use text_size::{TextRange, TextSize};

/// The effect of one contiguous edit: the span `from_old..to_old` of the
/// previous document became `from_new..to_new` in the new one.
///
/// A document edit yields these in ascending, non-overlapping order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangedRange {
    pub from_old: TextSize,
    pub to_old: TextSize,
    pub from_new: TextSize,
    pub to_new: TextSize,
}

impl ChangedRange {
    pub fn new(from_old: TextSize, to_old: TextSize, from_new: TextSize, to_new: TextSize) -> Self {
        Self {
            from_old,
            to_old,
            from_new,
            to_new,
        }
    }

    /// An insertion of `len` bytes at `pos`, with no earlier changes.
    pub fn insertion(pos: TextSize, len: TextSize) -> Self {
        Self::new(pos, pos, pos, pos + len)
    }

    /// A deletion of `range`, with no earlier changes.
    pub fn deletion(range: TextRange) -> Self {
        Self::new(range.start(), range.end(), range.start(), range.start())
    }

    pub fn old_range(&self) -> TextRange {
        TextRange::new(self.from_old, self.to_old)
    }

    pub fn new_range(&self) -> TextRange {
        TextRange::new(self.from_new, self.to_new)
    }

    /// Net length change caused by this range.
    pub fn len_delta(&self) -> i64 {
        i64::from(u32::from(self.to_new - self.from_new))
            - i64::from(u32::from(self.to_old - self.from_old))
    }

    /// Maps a position of the old document through an ordered change list.
    ///
    /// Positions inside a changed span map to the end of its new span.
    pub fn map_pos(changes: &[ChangedRange], pos: TextSize) -> TextSize {
        let mut delta = 0i64;
        for change in changes {
            if change.from_old > pos {
                break;
            }
            if change.to_old > pos {
                return change.to_new;
            }
            delta += change.len_delta();
        }
        shift(pos, delta)
    }

    /// Checks that a change list is well formed: every range is ordered,
    /// and ranges ascend without overlapping in both documents.
    pub fn validate(changes: &[ChangedRange]) -> Result<(), ChangeError> {
        let mut prev: Option<&ChangedRange> = None;
        for (index, change) in changes.iter().enumerate() {
            if change.from_old > change.to_old || change.from_new > change.to_new {
                return Err(ChangeError::Inverted { index });
            }
            if let Some(prev) = prev {
                if change.from_old < prev.from_old || change.from_new < prev.from_new {
                    return Err(ChangeError::Unsorted { index });
                }
                if change.from_old < prev.to_old || change.from_new < prev.to_new {
                    return Err(ChangeError::Overlapping { index });
                }
            }
            prev = Some(change);
        }
        Ok(())
    }

    /// Like [`ChangedRange::validate`], additionally requiring every range
    /// to fit inside the old and new document lengths.
    pub fn validate_within(
        changes: &[ChangedRange],
        old_len: TextSize,
        new_len: TextSize,
    ) -> Result<(), ChangeError> {
        Self::validate(changes)?;
        match changes.last() {
            Some(last) if last.to_old > old_len || last.to_new > new_len => {
                Err(ChangeError::OutOfBounds {
                    index: changes.len() - 1,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Applies a signed delta to a position, saturating at zero.
pub(crate) fn shift(pos: TextSize, delta: i64) -> TextSize {
    let shifted = i64::from(u32::from(pos)) + delta;
    TextSize::new(shifted.clamp(0, i64::from(u32::MAX)) as u32)
}
