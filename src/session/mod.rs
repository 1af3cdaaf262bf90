//! ParseSession: one resumable parse of one document version.
//!
//! A session owns the published tree, the fragments available for reuse,
//! and at most one in-flight parse handle. The handle is private mutable
//! state; its progress becomes visible only when it is promoted to a tree,
//! either on completion or through a forced finish.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = ParseSession::new(parser, document);
//!
//! // Work for at most 20ms; `false` means "not yet, call again".
//! let done = session.work(Duration::from_millis(20), None);
//!
//! // On edit: capture progress and reconcile fragments.
//! let next = session.with_changes(&change.changes, change.document);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use text_size::TextSize;
use tokio_util::sync::CancellationToken;

use crate::base::ChangedRange;
use crate::parser::{PartialParse, Parser};
use crate::text::{Document, TextCursor};
use crate::tree::{Tree, TreeFragment};

/// Drives one resumable parse of a document.
pub struct ParseSession {
    parser: Arc<dyn Parser>,
    document: Document,
    fragments: Vec<TreeFragment>,
    tree: Tree,
    parse: Option<Box<dyn PartialParse>>,
    /// Parser steps run by this session.
    steps: u64,
    /// Nodes the last finished parse took over from fragments.
    reused: usize,
}

enum Step {
    Continue,
    Finished(Tree),
    Reached(Tree),
}

impl ParseSession {
    /// A session for a freshly opened document, with nothing to reuse.
    pub fn new(parser: Arc<dyn Parser>, document: Document) -> Self {
        Self::with_fragments(parser, document, Vec::new(), Tree::empty())
    }

    fn with_fragments(
        parser: Arc<dyn Parser>,
        document: Document,
        fragments: Vec<TreeFragment>,
        tree: Tree,
    ) -> Self {
        Self {
            parser,
            document,
            fragments,
            tree,
            parse: None,
            steps: 0,
            reused: 0,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn fragments(&self) -> &[TreeFragment] {
        &self.fragments
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn parser(&self) -> &Arc<dyn Parser> {
        &self.parser
    }

    /// Total parser steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Fragment nodes reused by the current or last parse.
    pub fn reused_nodes(&self) -> usize {
        self.parse
            .as_ref()
            .map_or(self.reused, |parse| parse.reused_nodes())
    }

    /// How far the in-flight handle has read, if one exists.
    pub fn parsed_pos(&self) -> Option<TextSize> {
        self.parse.as_ref().map(|parse| parse.parsed_pos())
    }

    /// Whether a parse is in flight.
    pub fn is_parsing(&self) -> bool {
        self.parse.is_some()
    }

    /// Whether the published tree covers `up_to`, or the whole document
    /// when no target is given.
    pub fn is_done(&self, up_to: Option<TextSize>) -> bool {
        let len = self.document.len();
        let target = up_to.map_or(len, |up_to| up_to.min(len));
        self.tree.len() >= target
    }

    /// Work for at most `budget` of wall-clock time.
    ///
    /// Returns `true` once the tree covers the document (or `up_to`), and
    /// `false` when the budget ran out first. Elapsed time is checked
    /// before each parser step, so a zero budget runs no steps at all.
    pub fn work(&mut self, budget: Duration, up_to: Option<TextSize>) -> bool {
        let started = Instant::now();
        self.run(up_to, || started.elapsed() < budget)
    }

    /// Like [`ParseSession::work`], but stops before the next step once
    /// `cancel` fires. A step already running is allowed to finish.
    pub fn work_cancellable(
        &mut self,
        budget: Duration,
        up_to: Option<TextSize>,
        cancel: &CancellationToken,
    ) -> bool {
        let started = Instant::now();
        self.run(up_to, || !cancel.is_cancelled() && started.elapsed() < budget)
    }

    /// Like [`ParseSession::work`], but with a budget counted in parser
    /// steps instead of time.
    pub fn work_steps(&mut self, max_steps: usize, up_to: Option<TextSize>) -> bool {
        let mut left = max_steps;
        self.run(up_to, move || {
            let go = left > 0;
            left = left.saturating_sub(1);
            go
        })
    }

    fn run(&mut self, up_to: Option<TextSize>, mut may_step: impl FnMut() -> bool) -> bool {
        if self.is_done(up_to) {
            return true;
        }
        if self.parse.is_none() {
            self.parse = Some(self.start_parse());
        }
        // The handle may already be past the target; finishing is not a step.
        let reached = self
            .parse
            .as_ref()
            .filter(|parse| up_to.is_some_and(|up_to| parse.parsed_pos() >= up_to))
            .map(|parse| parse.force_finish());
        if let Some(tree) = reached {
            self.publish_if_longer(tree);
            return true;
        }

        loop {
            if !may_step() {
                tracing::trace!(
                    steps = self.steps,
                    pos = ?self.parsed_pos(),
                    "work budget exhausted"
                );
                return false;
            }

            let step = match self.parse.as_mut() {
                None => return true,
                Some(parse) => {
                    let finished = parse.advance();
                    match finished {
                        Some(tree) => Step::Finished(tree),
                        None if up_to.is_some_and(|up_to| parse.parsed_pos() >= up_to) => {
                            Step::Reached(parse.force_finish())
                        }
                        None => Step::Continue,
                    }
                }
            };
            self.steps += 1;

            match step {
                Step::Continue => {}
                Step::Finished(tree) => {
                    self.reused = self.reused_nodes();
                    self.parse = None;
                    self.publish(tree, false);
                    return true;
                }
                Step::Reached(tree) => {
                    self.publish_if_longer(tree);
                    return true;
                }
            }
        }
    }

    /// Capture in-flight progress as a published tree.
    ///
    /// If the handle has consumed input past the published tree, a forced
    /// finish of it becomes the new tree and is folded into the fragments.
    /// The handle itself stays in flight.
    pub fn take_tree(&mut self) -> Tree {
        let forced = self
            .parse
            .as_ref()
            .filter(|parse| parse.parsed_pos() > self.tree.len())
            .map(|parse| parse.force_finish());
        if let Some(tree) = forced {
            self.publish_if_longer(tree);
        }
        self.tree.clone()
    }

    /// The session for the next document version.
    ///
    /// In-flight progress is captured first, then the fragments are carried
    /// across `changes`. The new session starts with an empty tree unless
    /// nothing changed.
    pub fn with_changes(&mut self, changes: &[ChangedRange], document: Document) -> ParseSession {
        self.take_tree();
        let fragments = TreeFragment::apply_changes(&self.fragments, changes);
        let tree = if changes.is_empty() {
            self.tree.clone()
        } else {
            Tree::empty()
        };
        tracing::debug!(
            changes = changes.len(),
            fragments = fragments.len(),
            kept_tree = !tree.is_empty(),
            "derived parse session"
        );
        ParseSession::with_fragments(self.parser.clone(), document, fragments, tree)
    }

    fn start_parse(&self) -> Box<dyn PartialParse> {
        tracing::debug!(
            len = ?self.document.len(),
            fragments = self.fragments.len(),
            "starting parse"
        );
        self.parser
            .start(TextCursor::new(self.document.clone()), &self.fragments)
    }

    fn publish_if_longer(&mut self, tree: Tree) {
        if tree.len() > self.tree.len() {
            self.publish(tree, true);
        }
    }

    fn publish(&mut self, tree: Tree, partial: bool) {
        self.fragments = TreeFragment::add_tree(&tree, &self.fragments, partial);
        tracing::debug!(
            len = ?tree.len(),
            doc_len = ?self.document.len(),
            partial,
            steps = self.steps,
            "published syntax tree"
        );
        self.tree = tree;
    }
}

impl fmt::Debug for ParseSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseSession")
            .field("document", &self.document)
            .field("tree_len", &self.tree.len())
            .field("fragments", &self.fragments.len())
            .field(
                "parsed_pos",
                &self.parse.as_ref().map(|parse| parse.parsed_pos()),
            )
            .field("steps", &self.steps)
            .finish()
    }
}
