//! Deferred wake-ups: the host scheduling capability the scheduler runs on.
//!
//! Two implementations exist. [`IdleWakeups`] fires when the host reports
//! an idle window, or once the maximum deferral has passed without one.
//! [`TimerWakeups`] is the fallback for hosts without idle reporting and
//! fires after a fixed pause. [`AnyWakeups::select`] picks one at startup.

use std::time::{Duration, Instant};

use crate::base::WorkConfig;

/// Handle to a requested wake-up, used to revoke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WakeupId(u64);

/// How a wake-up fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The host is idle for `remaining` more time.
    Idle { remaining: Duration },
    /// A timer fired, or a request hit its maximum deferral.
    Timer,
}

/// Request, revoke and poll deferred callbacks.
pub trait Wakeups {
    /// Ask for a wake-up no earlier than `not_before`, firing at the
    /// latest `max_deferral` after that.
    fn request(&mut self, not_before: Instant, max_deferral: Duration) -> WakeupId;

    /// Forget a pending wake-up. Unknown ids are ignored.
    fn revoke(&mut self, id: WakeupId);

    /// The next wake-up due at `now`, if any. A wake-up is returned once.
    fn due(&mut self, now: Instant) -> Option<(WakeupId, Wake)>;
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    id: WakeupId,
    not_before: Instant,
    deadline: Instant,
}

#[derive(Debug, Default, Clone, Copy)]
struct IdGen(u64);

impl IdGen {
    fn next(&mut self) -> WakeupId {
        self.0 += 1;
        WakeupId(self.0)
    }
}

/// Wake-ups driven by idle windows the host reports.
#[derive(Debug, Default)]
pub struct IdleWakeups {
    ids: IdGen,
    pending: Vec<Pending>,
    idle_until: Option<Instant>,
}

impl IdleWakeups {
    pub fn new() -> Self {
        Self::default()
    }

    /// The host will stay idle until `until`.
    pub fn report_idle(&mut self, until: Instant) {
        self.idle_until = Some(until);
    }

    /// The host is busy again.
    pub fn report_busy(&mut self) {
        self.idle_until = None;
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Wakeups for IdleWakeups {
    fn request(&mut self, not_before: Instant, max_deferral: Duration) -> WakeupId {
        let id = self.ids.next();
        self.pending.push(Pending {
            id,
            not_before,
            deadline: not_before + max_deferral,
        });
        id
    }

    fn revoke(&mut self, id: WakeupId) {
        self.pending.retain(|pending| pending.id != id);
    }

    fn due(&mut self, now: Instant) -> Option<(WakeupId, Wake)> {
        let idle = self.idle_until.filter(|until| *until > now);
        let index = self.pending.iter().position(|pending| {
            pending.not_before <= now && (idle.is_some() || pending.deadline <= now)
        })?;
        let pending = self.pending.remove(index);

        let wake = match idle {
            Some(until) => Wake::Idle {
                remaining: until - now,
            },
            None => Wake::Timer,
        };
        Some((pending.id, wake))
    }
}

/// Wake-ups that fire a fixed pause after they become eligible.
#[derive(Debug)]
pub struct TimerWakeups {
    pause: Duration,
    ids: IdGen,
    pending: Vec<(WakeupId, Instant)>,
}

impl TimerWakeups {
    pub fn new(pause: Duration) -> Self {
        Self {
            pause,
            ids: IdGen::default(),
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Wakeups for TimerWakeups {
    fn request(&mut self, not_before: Instant, max_deferral: Duration) -> WakeupId {
        let id = self.ids.next();
        self.pending
            .push((id, not_before + self.pause.min(max_deferral)));
        id
    }

    fn revoke(&mut self, id: WakeupId) {
        self.pending.retain(|(pending, _)| *pending != id);
    }

    fn due(&mut self, now: Instant) -> Option<(WakeupId, Wake)> {
        let index = self.pending.iter().position(|(_, at)| *at <= now)?;
        let (id, _) = self.pending.remove(index);
        Some((id, Wake::Timer))
    }
}

/// Either wake-up source, chosen once at startup.
#[derive(Debug)]
pub enum AnyWakeups {
    Idle(IdleWakeups),
    Timer(TimerWakeups),
}

impl AnyWakeups {
    /// Idle-driven wake-ups when the host can report idle time, a timer
    /// otherwise.
    pub fn select(idle_supported: bool, config: &WorkConfig) -> Self {
        if idle_supported {
            AnyWakeups::Idle(IdleWakeups::new())
        } else {
            AnyWakeups::Timer(TimerWakeups::new(config.min_pause))
        }
    }

    /// Forward an idle window to the idle source. Timers ignore it.
    pub fn report_idle(&mut self, until: Instant) {
        if let AnyWakeups::Idle(idle) = self {
            idle.report_idle(until);
        }
    }

    pub fn report_busy(&mut self) {
        if let AnyWakeups::Idle(idle) = self {
            idle.report_busy();
        }
    }

    pub fn pending(&self) -> usize {
        match self {
            AnyWakeups::Idle(idle) => idle.pending(),
            AnyWakeups::Timer(timer) => timer.pending(),
        }
    }
}

impl Wakeups for AnyWakeups {
    fn request(&mut self, not_before: Instant, max_deferral: Duration) -> WakeupId {
        match self {
            AnyWakeups::Idle(idle) => idle.request(not_before, max_deferral),
            AnyWakeups::Timer(timer) => timer.request(not_before, max_deferral),
        }
    }

    fn revoke(&mut self, id: WakeupId) {
        match self {
            AnyWakeups::Idle(idle) => idle.revoke(id),
            AnyWakeups::Timer(timer) => timer.revoke(id),
        }
    }

    fn due(&mut self, now: Instant) -> Option<(WakeupId, Wake)> {
        match self {
            AnyWakeups::Idle(idle) => idle.due(now),
            AnyWakeups::Timer(timer) => timer.due(now),
        }
    }
}
