//! Background scheduler: slices parse work into deferred wake-ups.
//!
//! ```text
//!            on_change (incomplete)
//!   Idle ───────────────────────────▶ Scheduled
//!    ▲                                  │ wake-up fires
//!    │ tree complete                    ▼
//!    └──────────────────────────────  Running ──▶ Scheduled (slice ran out)
//!
//!   any state ── teardown ──▶ TornDown
//! ```
//!
//! Everything runs on the caller's thread; the scheduler never spawns.
//! Trees produced by a slice are sent over an update channel and merged
//! by the host as if they were edits.

mod wakeups;

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::base::WorkConfig;
use crate::language::LanguageState;
use crate::session::ParseSession;
use crate::tree::Tree;

pub use wakeups::{AnyWakeups, IdleWakeups, TimerWakeups, Wake, WakeupId, Wakeups};

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled(WakeupId),
    Running,
    TornDown,
}

/// A tree produced by background work, tagged with the session it came from.
#[derive(Debug, Clone)]
pub struct TreeUpdate {
    pub tree: Tree,
    pub session: Arc<Mutex<ParseSession>>,
    /// The tree covers the whole document.
    pub complete: bool,
}

/// Background parse time allowed per window.
#[derive(Debug)]
struct ChunkBudget {
    window_end: Option<Instant>,
    remaining: Duration,
}

impl ChunkBudget {
    fn refresh(&mut self, now: Instant, config: &WorkConfig) {
        if self.window_end.is_none_or(|end| now >= end) {
            self.window_end = Some(now + config.chunk_window);
            self.remaining = config.chunk_budget;
        }
    }
}

/// Drives a language state's parse session in the background.
pub struct BackgroundScheduler<W: Wakeups = AnyWakeups> {
    wakeups: W,
    config: WorkConfig,
    state: SchedulerState,
    chunk: ChunkBudget,
    cancel: CancellationToken,
    updates: Sender<TreeUpdate>,
}

impl<W: Wakeups> BackgroundScheduler<W> {
    /// A scheduler plus the receiving end of its update channel.
    pub fn new(wakeups: W, config: WorkConfig) -> (Self, Receiver<TreeUpdate>) {
        let (updates, receiver) = mpsc::channel();
        let scheduler = Self {
            wakeups,
            config,
            state: SchedulerState::Idle,
            chunk: ChunkBudget {
                window_end: None,
                remaining: config.chunk_budget,
            },
            cancel: CancellationToken::new(),
            updates,
        };
        (scheduler, receiver)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &WorkConfig {
        &self.config
    }

    pub fn wakeups(&self) -> &W {
        &self.wakeups
    }

    pub fn wakeups_mut(&mut self) -> &mut W {
        &mut self.wakeups
    }

    /// Background time left in the current window.
    pub fn chunk_remaining(&self) -> Duration {
        self.chunk.remaining
    }

    /// A token that tears this scheduler down when cancelled, usable from
    /// inside a running slice.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A new language state was committed.
    pub fn on_change(&mut self, now: Instant, language: &LanguageState) {
        if self.check_teardown() {
            return;
        }
        self.chunk.refresh(now, &self.config);
        self.chunk.remaining += self.config.change_bonus;
        self.schedule(now, language);
    }

    /// Run a slice if the pending wake-up is due. Returns whether work ran.
    pub fn tick(&mut self, now: Instant, language: &LanguageState) -> bool {
        if self.check_teardown() {
            return false;
        }
        let SchedulerState::Scheduled(id) = self.state else {
            return false;
        };
        let Some((fired, wake)) = self.wakeups.due(now) else {
            return false;
        };
        if fired != id {
            tracing::trace!(?fired, ?id, "ignoring foreign wake-up");
            return false;
        }

        self.state = SchedulerState::Running;
        self.chunk.refresh(now, &self.config);
        let slice = self.slice_for(wake);
        tracing::trace!(?wake, ?slice, "running background slice");

        let started = Instant::now();
        let (done, tree) = {
            let mut session = language.session().lock();
            let done = session.work_cancellable(slice, None, &self.cancel);
            let exhausted = self.chunk.remaining <= started.elapsed();
            let tree = if (done || exhausted) && !self.cancel.is_cancelled() {
                Some(session.take_tree())
            } else {
                None
            };
            (done, tree)
        };
        self.chunk.remaining = self.chunk.remaining.saturating_sub(started.elapsed());

        if self.is_torn_down() {
            tracing::debug!("discarding slice result after teardown");
            self.state = SchedulerState::TornDown;
            return true;
        }

        if let Some(tree) = tree {
            self.publish(tree, done, language);
        }
        if done {
            tracing::debug!("background parse complete");
            self.state = SchedulerState::Idle;
        } else {
            self.state = SchedulerState::Idle;
            self.schedule(now + started.elapsed(), language);
        }
        true
    }

    /// Revoke pending work. Nothing runs afterwards.
    pub fn teardown(&mut self) {
        self.cancel.cancel();
        self.check_teardown();
    }

    fn check_teardown(&mut self) -> bool {
        if !self.is_torn_down() {
            return false;
        }
        if let SchedulerState::Scheduled(id) = self.state {
            self.wakeups.revoke(id);
            tracing::debug!(?id, "revoked pending wake-up");
        }
        self.state = SchedulerState::TornDown;
        true
    }

    /// Request a wake-up if idle and `language` still has work left.
    pub fn schedule(&mut self, now: Instant, language: &LanguageState) {
        if self.state != SchedulerState::Idle {
            return;
        }
        if language.is_complete() {
            return;
        }

        self.chunk.refresh(now, &self.config);
        let not_before = match self.chunk.window_end {
            // Out of background time: wait for the window to refill.
            Some(end) if self.chunk.remaining.is_zero() => end,
            _ => now,
        };
        let id = self.wakeups.request(not_before, self.config.max_deferral);
        tracing::trace!(?id, deferred = ?(not_before - now), "scheduled background work");
        self.state = SchedulerState::Scheduled(id);
    }

    fn slice_for(&self, wake: Wake) -> Duration {
        let wanted = match wake {
            Wake::Idle { remaining } => remaining.max(self.config.min_slice),
            Wake::Timer => self.config.slice,
        };
        wanted.min(self.config.slice).min(self.chunk.remaining)
    }

    fn publish(&self, tree: Tree, complete: bool, language: &LanguageState) {
        let update = TreeUpdate {
            tree,
            session: language.session().clone(),
            complete,
        };
        if self.updates.send(update).is_err() {
            tracing::trace!("update receiver dropped");
        }
    }
}

impl<W: Wakeups + std::fmt::Debug> std::fmt::Debug for BackgroundScheduler<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundScheduler")
            .field("state", &self.state)
            .field("wakeups", &self.wakeups)
            .field("chunk_remaining", &self.chunk.remaining)
            .finish()
    }
}
