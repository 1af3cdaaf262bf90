//! Chunk-caching cursor over a [`Document`].
//!
//! Parsers mostly scan forward one character at a time, with occasional
//! jumps back for lookahead or error recovery. Going to the rope for every
//! character would cost a tree descent per call, so the cursor keeps the
//! chunk it is reading and the one before it. Requests inside either are
//! served locally. Requests outside both fetch a new chunk: continuing the
//! forward chunk cursor when possible, reseeking it otherwise.

use std::borrow::Cow;

use text_size::{TextRange, TextSize};

use super::Document;

/// Counters for how often the cursor had to touch the rope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorStats {
    /// Chunks copied out of the rope, sequential or not.
    pub chunk_loads: usize,
    /// Loads that did not continue the forward chunk cursor.
    pub reseeks: usize,
}

#[derive(Debug, Clone, Default)]
struct Chunk {
    start: usize,
    text: String,
}

impl Chunk {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }

    fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Current,
    Previous,
}

/// Read access to a document for one parse.
///
/// A cursor is owned by a single parse and never shared; each new parse
/// gets its own cursor bound to the document it reads.
#[derive(Debug, Clone)]
pub struct TextCursor {
    document: Document,
    end: usize,
    current: Chunk,
    previous: Chunk,
    /// Where the forward chunk cursor stands: the end of the last chunk
    /// fetched from the rope.
    next_chunk: usize,
    stats: CursorStats,
}

impl TextCursor {
    pub fn new(document: Document) -> Self {
        let end = usize::from(document.len());
        Self::bounded(document, end)
    }

    fn bounded(document: Document, end: usize) -> Self {
        Self {
            document,
            end,
            current: Chunk::default(),
            previous: Chunk::default(),
            next_chunk: 0,
            stats: CursorStats::default(),
        }
    }

    /// A cursor over the same document that treats it as ending at `at`.
    ///
    /// Used to parse a bounded region such as one embedded block.
    pub fn truncate(&self, at: TextSize) -> TextCursor {
        let end = usize::from(at).min(self.end);
        Self::bounded(self.document.clone(), end)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Length of the readable text, after truncation.
    pub fn len(&self) -> TextSize {
        TextSize::new(self.end as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    pub fn stats(&self) -> CursorStats {
        self.stats
    }

    /// The byte at `pos`, or `None` past the end.
    pub fn byte_at(&mut self, pos: TextSize) -> Option<u8> {
        let pos = usize::from(pos);
        if pos >= self.end {
            return None;
        }
        let slot = self.locate(pos);
        let chunk = self.chunk(slot);
        chunk.text.as_bytes().get(pos - chunk.start).copied()
    }

    /// The character starting at `pos`, or `None` past the end or when
    /// `pos` is not on a character boundary.
    pub fn char_at(&mut self, pos: TextSize) -> Option<char> {
        let pos = usize::from(pos);
        if pos >= self.end {
            return None;
        }
        // Rope chunks always split on character boundaries.
        let slot = self.locate(pos);
        let chunk = self.chunk(slot);
        chunk.text.get(pos - chunk.start..)?.chars().next()
    }

    /// The text from `pos` up to the next `\n` (exclusive) or the end.
    pub fn line_slice(&mut self, pos: TextSize) -> Cow<'_, str> {
        let pos = usize::from(pos);
        if pos >= self.end {
            return Cow::Borrowed("");
        }

        let slot = self.locate(pos);
        let (start, limit) = {
            let chunk = self.chunk(slot);
            (chunk.start, chunk.end().min(self.end))
        };
        let newline = self.chunk(slot).text[pos - start..limit - start].find('\n');
        if let Some(newline) = newline {
            return Cow::Borrowed(&self.chunk(slot).text[pos - start..pos - start + newline]);
        }
        if limit == self.end {
            return Cow::Borrowed(&self.chunk(slot).text[pos - start..limit - start]);
        }

        let mut line = self.chunk(slot).text[pos - start..limit - start].to_owned();
        let mut at = limit;
        while at < self.end {
            let slot = self.locate(at);
            let chunk = self.chunk(slot);
            let limit = chunk.end().min(self.end);
            let local = &chunk.text[at - chunk.start..limit - chunk.start];
            if let Some(newline) = local.find('\n') {
                line.push_str(&local[..newline]);
                break;
            }
            line.push_str(local);
            at = limit;
        }
        Cow::Owned(line)
    }

    /// The text of `from..to`, clamped to the readable length.
    pub fn read_range(&mut self, from: TextSize, to: TextSize) -> Cow<'_, str> {
        let from = usize::from(from);
        let to = usize::from(to).min(self.end);
        if from >= to {
            return Cow::Borrowed("");
        }

        let slot = self.locate(from);
        let (start, end) = {
            let chunk = self.chunk(slot);
            (chunk.start, chunk.end())
        };
        if to <= end {
            return Cow::Borrowed(&self.chunk(slot).text[from - start..to - start]);
        }

        let mut text = String::with_capacity(to - from);
        let mut at = from;
        while at < to {
            let slot = self.locate(at);
            let chunk = self.chunk(slot);
            let limit = chunk.end().min(to);
            text.push_str(&chunk.text[at - chunk.start..limit - chunk.start]);
            at = limit;
        }
        Cow::Owned(text)
    }

    /// Convenience for [`TextCursor::read_range`] over a [`TextRange`].
    pub fn read(&mut self, range: TextRange) -> Cow<'_, str> {
        self.read_range(range.start(), range.end())
    }

    fn chunk(&self, slot: Slot) -> &Chunk {
        match slot {
            Slot::Current => &self.current,
            Slot::Previous => &self.previous,
        }
    }

    /// Make sure `pos` is cached and say where. `pos` must be below `end`.
    fn locate(&mut self, pos: usize) -> Slot {
        if self.current.contains(pos) {
            return Slot::Current;
        }
        if self.previous.contains(pos) {
            return Slot::Previous;
        }

        let (text, start) = self.document.chunk_at(pos);
        self.stats.chunk_loads += 1;
        if start != self.next_chunk {
            // Jumping ahead skips chunks; jumping back rewinds the cursor.
            self.stats.reseeks += 1;
            tracing::trace!(pos, from = self.next_chunk, "text cursor reseek");
        }

        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.start = start;
        self.current.text.clear();
        self.current.text.push_str(text);
        self.next_chunk = self.current.end();
        Slot::Current
    }
}
