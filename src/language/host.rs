//! LanguageHost: the per-document entry point a host application talks to.
//!
//! ## Usage
//!
//! ```ignore
//! let config = WorkConfig::default();
//! let wakeups = AnyWakeups::select(idle_supported, &config);
//! let mut host = LanguageHost::new(language, document, wakeups, config, Instant::now());
//!
//! // On every committed edit
//! host.apply_change(&change, Instant::now());
//!
//! // From the event loop
//! host.poll(Instant::now());
//!
//! let tree = host.get_tree();
//! let tree = host.ensure_tree(pos, Duration::from_millis(50))?;
//! let data = host.language_data_at(pos);
//! ```

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use rowan::NodeOrToken;
use text_size::{TextRange, TextSize};

use super::{Language, LanguageData, LanguageState};
use crate::base::{NotReady, WorkConfig};
use crate::scheduler::{AnyWakeups, BackgroundScheduler, TreeUpdate, Wakeups};
use crate::text::{Document, DocumentChange};
use crate::tree::Tree;

/// Owns a document's language state and its background scheduler.
#[derive(Debug)]
pub struct LanguageHost<W: Wakeups + std::fmt::Debug = AnyWakeups> {
    language: Language,
    config: WorkConfig,
    state: LanguageState,
    scheduler: BackgroundScheduler<W>,
    updates: Receiver<TreeUpdate>,
}

impl<W: Wakeups + std::fmt::Debug> LanguageHost<W> {
    pub fn new(
        language: Language,
        document: Document,
        wakeups: W,
        config: WorkConfig,
        now: Instant,
    ) -> Self {
        let state = LanguageState::init(&language, document, &config);
        let (mut scheduler, updates) = BackgroundScheduler::new(wakeups, config);
        scheduler.on_change(now, &state);
        tracing::debug!(
            language = language.name(),
            tree_len = ?state.tree().len(),
            doc_len = ?state.document().len(),
            "opened document"
        );
        Self {
            language,
            config,
            state,
            scheduler,
            updates,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn state(&self) -> &LanguageState {
        &self.state
    }

    pub fn scheduler(&self) -> &BackgroundScheduler<W> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut BackgroundScheduler<W> {
        &mut self.scheduler
    }

    /// Commit an edit: derive the next state and schedule background work.
    pub fn apply_change(&mut self, change: &DocumentChange, now: Instant) {
        // Updates from the superseded session would be dropped anyway.
        self.merge_updates();
        self.state = self.state.apply(change, &self.config);
        self.scheduler.on_change(now, &self.state);
    }

    /// Run due background work and fold in its results. Returns whether
    /// the published tree changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.scheduler.tick(now, &self.state);
        let changed = self.merge_updates();
        // A slice may have finished a session that was superseded meanwhile.
        self.scheduler.schedule(now, &self.state);
        changed
    }

    /// The latest published tree. May be partial.
    pub fn get_tree(&self) -> Tree {
        self.state.tree().clone()
    }

    /// A tree covering at least `up_to`, parsing synchronously for at most
    /// `timeout` if the published tree falls short.
    pub fn ensure_tree(&mut self, up_to: TextSize, timeout: Duration) -> Result<Tree, NotReady> {
        self.merge_updates();
        let target = up_to.min(self.state.document().len());
        if self.state.tree().len() >= target {
            return Ok(self.get_tree());
        }

        let tree = {
            let mut session = self.state.session().lock();
            session.work(timeout, Some(target));
            session.tree().clone()
        };
        if tree.len() > self.state.tree().len() {
            self.state = self.state.with_tree(tree.clone());
        }
        if tree.len() >= target {
            Ok(tree)
        } else {
            tracing::debug!(?up_to, ?timeout, tree_len = ?tree.len(), "tree not ready");
            Err(NotReady { up_to, timeout })
        }
    }

    /// The language data in effect at `pos`.
    ///
    /// Walks from the innermost node at `pos` outward and returns the
    /// first embedded language whose scope is known. Positions the tree
    /// does not reach yet belong to the top-level language.
    pub fn language_data_at(&self, pos: TextSize) -> Arc<LanguageData> {
        let top = self.language.data().clone();
        let tree = self.state.tree();
        if tree.is_empty() || pos > tree.len() {
            return top;
        }

        let root = tree.root();
        let node = match root.covering_element(TextRange::empty(pos)) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => match token.parent() {
                Some(parent) => parent,
                None => return top,
            },
        };

        let parser = self.language.parser();
        node.ancestors()
            .filter_map(|node| parser.scope_of(&node))
            .find_map(|scope| self.language.nested(&scope).cloned())
            .unwrap_or(top)
    }

    /// Stop background work. Results still in flight are discarded.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
        let dropped = self.updates.try_iter().count();
        tracing::debug!(dropped, "language host torn down");
    }

    fn merge_updates(&mut self) -> bool {
        if self.scheduler.is_torn_down() {
            return false;
        }
        let mut changed = false;
        while let Ok(update) = self.updates.try_recv() {
            let current = Arc::ptr_eq(&update.session, self.state.session());
            if !current || update.tree.len() < self.state.tree().len() {
                tracing::trace!(current, "dropping stale tree update");
                continue;
            }
            changed |= update.tree != *self.state.tree();
            self.state = self.state.with_tree(update.tree);
        }
        changed
    }
}
