//! Resumable parser for the line grammar
//!
//! The grammar is deliberately small: a document is a sequence of lines,
//! and a line starting with three backticks opens a fenced block that runs
//! until a line holding only three backticks. The text after the opening
//! backticks names the block's language and becomes its scope marker.
//!
//! ```text
//! DOCUMENT
//!   LINE          tokens... NEWLINE
//!   EMBED
//!     FENCE_OPEN  FENCE WHITESPACE? WORD? NEWLINE
//!     EMBED_LINE  TEXT? NEWLINE
//!     FENCE_CLOSE FENCE NEWLINE?
//! ```
//!
//! One step consumes one line, or takes over one fragment that starts at
//! the current position and is valid in the current context.

use rowan::{GreenNode, GreenNodeBuilder, GreenNodeData, GreenToken, NodeOrToken};
use smol_str::SmolStr;
use text_size::TextSize;

use super::lexer::Lexer;
use super::syntax_kind::SyntaxKind;
use super::{PartialParse, Parser};
use crate::text::TextCursor;
use crate::tree::{Tree, TreeFragment, TreeNode};

type GreenElement = NodeOrToken<GreenNode, GreenToken>;

const FENCE_MARK: &str = "```";

/// Parser for the line grammar. Stateless; every parse gets its own handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineParser;

impl LineParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for LineParser {
    fn start(&self, input: TextCursor, fragments: &[TreeFragment]) -> Box<dyn PartialParse> {
        Box::new(LineParse::new(input, fragments))
    }

    fn scope_of(&self, node: &TreeNode) -> Option<SmolStr> {
        if node.kind() != SyntaxKind::EMBED {
            return None;
        }
        let open = node
            .first_child()
            .filter(|child| child.kind() == SyntaxKind::FENCE_OPEN)?;
        open.children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == SyntaxKind::WORD)
            .map(|token| SmolStr::new(token.text()))
    }
}

/// The in-flight state of one line-grammar parse.
struct LineParse {
    input: TextCursor,
    fragments: Vec<TreeFragment>,
    next_fragment: usize,
    pos: TextSize,
    end: TextSize,
    /// Finished top-level nodes.
    lines: Vec<GreenElement>,
    /// Children of the fenced block being parsed, if one is open.
    open: Option<Vec<GreenElement>>,
    reused: usize,
}

impl LineParse {
    fn new(input: TextCursor, fragments: &[TreeFragment]) -> Self {
        let end = input.len();
        Self {
            input,
            fragments: fragments.to_vec(),
            next_fragment: 0,
            pos: TextSize::new(0),
            end,
            lines: Vec::new(),
            open: None,
            reused: 0,
        }
    }

    /// The fragment at the current position, if its kind fits the context.
    fn reusable(&mut self) -> Option<GreenNode> {
        while self
            .fragments
            .get(self.next_fragment)
            .is_some_and(|fragment| fragment.start() < self.pos)
        {
            self.next_fragment += 1;
        }

        let fragment = self.fragments.get(self.next_fragment)?;
        if fragment.start() != self.pos || fragment.end() > self.end {
            return None;
        }
        let fits = match SyntaxKind::from_raw(fragment.kind())? {
            SyntaxKind::LINE | SyntaxKind::FENCE_OPEN => self.open.is_none(),
            SyntaxKind::EMBED => self.open.is_none() && is_closed(fragment.node()),
            SyntaxKind::EMBED_LINE | SyntaxKind::FENCE_CLOSE => self.open.is_some(),
            _ => false,
        };
        if !fits {
            return None;
        }

        self.next_fragment += 1;
        Some(fragment.node().clone())
    }

    /// Parse the line at the current position.
    fn parse_line(&mut self) -> (SyntaxKind, GreenNode) {
        let line = self.input.line_slice(self.pos);
        let newline = self.pos + TextSize::of(&*line) < self.end;

        let kind = match self.open {
            Some(_) if line.trim_end() == FENCE_MARK => SyntaxKind::FENCE_CLOSE,
            Some(_) => SyntaxKind::EMBED_LINE,
            None if line.starts_with(FENCE_MARK) => SyntaxKind::FENCE_OPEN,
            None => SyntaxKind::LINE,
        };
        let node = match kind {
            SyntaxKind::FENCE_OPEN | SyntaxKind::FENCE_CLOSE => fence_node(kind, &line, newline),
            SyntaxKind::EMBED_LINE => text_node(&line, newline),
            _ => line_node(&line, newline),
        };
        (kind, node)
    }

    fn push(&mut self, kind: SyntaxKind, node: GreenNode) {
        let node = NodeOrToken::Node(node);
        match (kind, self.open.as_mut()) {
            (SyntaxKind::FENCE_OPEN, _) => self.open = Some(vec![node]),
            (SyntaxKind::FENCE_CLOSE, Some(children)) => {
                children.push(node);
                let children = self.open.take().unwrap_or_default();
                self.lines.push(NodeOrToken::Node(GreenNode::new(
                    SyntaxKind::EMBED.into(),
                    children,
                )));
            }
            (SyntaxKind::EMBED_LINE, Some(children)) => children.push(node),
            _ => self.lines.push(node),
        }
    }

    fn build(&self, forced: bool) -> Tree {
        let mut children = self.lines.clone();
        if let Some(open) = &self.open {
            // Unterminated block: mark the missing closing fence.
            let mut block = open.clone();
            block.push(NodeOrToken::Node(error_node()));
            children.push(NodeOrToken::Node(GreenNode::new(
                SyntaxKind::EMBED.into(),
                block,
            )));
        }
        if forced && self.pos < self.end {
            children.push(NodeOrToken::Node(error_node()));
        }
        Tree::new(GreenNode::new(SyntaxKind::DOCUMENT.into(), children))
    }
}

impl PartialParse for LineParse {
    fn advance(&mut self) -> Option<Tree> {
        if self.pos >= self.end {
            return Some(self.build(false));
        }

        if let Some(node) = self.reusable() {
            let kind = SyntaxKind::from_raw(node.kind()).unwrap_or(SyntaxKind::ERROR);
            tracing::trace!(pos = ?self.pos, len = ?node.text_len(), ?kind, "reused fragment");
            self.pos += node.text_len();
            self.reused += 1;
            self.push(kind, node);
        } else {
            let (kind, node) = self.parse_line();
            self.pos += node.text_len();
            self.push(kind, node);
        }

        (self.pos >= self.end).then(|| self.build(false))
    }

    fn parsed_pos(&self) -> TextSize {
        self.pos
    }

    fn force_finish(&self) -> Tree {
        self.build(true)
    }

    fn reused_nodes(&self) -> usize {
        self.reused
    }
}

fn is_closed(block: &GreenNodeData) -> bool {
    block
        .children()
        .last()
        .is_some_and(|child| child.kind() == SyntaxKind::FENCE_CLOSE)
}

fn error_node() -> GreenNode {
    GreenNode::new(SyntaxKind::ERROR.into(), Vec::new())
}

fn line_node(text: &str, newline: bool) -> GreenNode {
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind::LINE.into());
    lex_into(&mut builder, text);
    finish_node(builder, newline)
}

fn fence_node(kind: SyntaxKind, text: &str, newline: bool) -> GreenNode {
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(kind.into());
    builder.token(SyntaxKind::FENCE.into(), FENCE_MARK);
    lex_into(&mut builder, &text[FENCE_MARK.len()..]);
    finish_node(builder, newline)
}

fn text_node(text: &str, newline: bool) -> GreenNode {
    let mut builder = GreenNodeBuilder::new();
    builder.start_node(SyntaxKind::EMBED_LINE.into());
    if !text.is_empty() {
        builder.token(SyntaxKind::TEXT.into(), text);
    }
    finish_node(builder, newline)
}

fn lex_into(builder: &mut GreenNodeBuilder<'static>, text: &str) {
    for token in Lexer::new(text) {
        builder.token(token.kind.into(), token.text);
    }
}

fn finish_node(mut builder: GreenNodeBuilder<'static>, newline: bool) -> GreenNode {
    if newline {
        builder.token(SyntaxKind::NEWLINE.into(), "\n");
    }
    builder.finish_node();
    builder.finish()
}
