//! Syntax kinds for the reference line grammar
//!
//! This enum defines all node and token kinds produced by [`LineParser`](super::LineParser).
//! The incremental core itself is kind-agnostic; only the parser and its
//! scope markers interpret these.

/// All syntax kinds (tokens and nodes) of the line grammar
///
/// Tokens are leaves (words, numbers, punctuation, raw embedded text).
/// Nodes are lines, fenced blocks, and recovery markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    COMMENT,            // # to end of line
    NEWLINE,            // \n

    // =========================================================================
    // TOKENS
    // =========================================================================
    WORD,               // identifier-like run
    NUMBER,             // 42, 3.14
    STRING,             // "hello"
    PUNCT,              // any single ASCII punctuation character
    FENCE,              // ``` at the start of a fence line
    TEXT,               // raw line content inside a fenced block

    // =========================================================================
    // NODES
    // =========================================================================
    DOCUMENT,
    LINE,               // one top-level line
    EMBED,              // fenced block: FENCE_OPEN EMBED_LINE* FENCE_CLOSE
    FENCE_OPEN,
    FENCE_CLOSE,
    EMBED_LINE,

    // Special
    ERROR,              // unlexable token, or zero-length recovery node

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace, comment, line break)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::COMMENT | Self::NEWLINE)
    }

    /// Check if this kind is a leaf token
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::TEXT as u16)
    }

    /// Convert a raw kind, rejecting values this grammar never produces
    pub fn from_raw(raw: rowan::SyntaxKind) -> Option<Self> {
        if raw.0 < SyntaxKind::__LAST as u16 {
            // Safety: we control all syntax kinds and check bounds above
            Some(unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) })
        } else {
            None
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl PartialEq<SyntaxKind> for rowan::SyntaxKind {
    fn eq(&self, other: &SyntaxKind) -> bool {
        self.0 == *other as u16
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineLanguage {}

impl rowan::Language for LineLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw).unwrap_or(SyntaxKind::ERROR)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<LineLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<LineLanguage>;
