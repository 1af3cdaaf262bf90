//! LanguageState: the value a host stores per document version.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Language;
use crate::base::{ChangedRange, WorkConfig};
use crate::session::ParseSession;
use crate::text::{Document, DocumentChange};
use crate::tree::Tree;

/// A published tree paired with the session that produced it.
///
/// States are replaced on every committed edit, never mutated. The session
/// behind the mutex keeps working between snapshots; its progress only
/// shows up here once a new state is built around a newer tree.
#[derive(Clone)]
pub struct LanguageState {
    tree: Tree,
    document: Document,
    session: Arc<Mutex<ParseSession>>,
}

impl LanguageState {
    /// State for a freshly opened document, after one synchronous slice.
    pub fn init(language: &Language, document: Document, config: &WorkConfig) -> Self {
        let mut session = ParseSession::new(language.parser().clone(), document);
        session.work(config.apply_budget, None);
        Self::from_session(session)
    }

    fn from_session(session: ParseSession) -> Self {
        Self {
            tree: session.tree().clone(),
            document: session.document().clone(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// The state for the document after `change`.
    ///
    /// Progress of the current session is captured before its fragments
    /// are reconciled, then the new session gets a synchronous slice aimed
    /// at covering what the old tree covered.
    pub fn apply(&self, change: &DocumentChange, config: &WorkConfig) -> Self {
        if change.changes.is_empty() {
            return self.clone();
        }

        let (mut next, up_to) = {
            let mut session = self.session.lock();
            let covered = session.take_tree().len();
            let up_to = (covered < session.document().len())
                .then(|| ChangedRange::map_pos(&change.changes, covered));
            let next = session.with_changes(&change.changes, change.document.clone());
            (next, up_to)
        };

        next.work(config.apply_budget, up_to);
        tracing::debug!(
            changes = change.changes.len(),
            tree_len = ?next.tree().len(),
            doc_len = ?next.document().len(),
            "applied document change"
        );
        Self::from_session(next)
    }

    /// The same session with a newer published tree.
    pub(crate) fn with_tree(&self, tree: Tree) -> Self {
        Self {
            tree,
            document: self.document.clone(),
            session: self.session.clone(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn session(&self) -> &Arc<Mutex<ParseSession>> {
        &self.session
    }

    /// Whether the published tree covers the whole document.
    pub fn is_complete(&self) -> bool {
        self.tree.len() >= self.document.len()
    }
}

impl fmt::Debug for LanguageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageState")
            .field("tree_len", &self.tree.len())
            .field("doc_len", &self.document.len())
            .finish()
    }
}
