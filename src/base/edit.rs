//! Text edits requested against a document.

use text_size::{TextRange, TextSize};

/// Replace `range` of the current document with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(pos: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(pos), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self::new(range, text)
    }

    /// Length of the inserted text.
    pub fn insert_len(&self) -> TextSize {
        TextSize::of(self.new_text.as_str())
    }

    /// Length change caused by this edit.
    pub fn len_delta(&self) -> i64 {
        i64::from(u32::from(self.insert_len())) - i64::from(u32::from(self.range.len()))
    }
}

impl From<(std::ops::Range<u32>, &str)> for TextEdit {
    fn from((range, text): (std::ops::Range<u32>, &str)) -> Self {
        Self::new(TextRange::new(range.start.into(), range.end.into()), text)
    }
}
