//! Time budgets for synchronous and background parse work.

use std::time::Duration;

/// Tuning knobs for how much parse work runs where.
///
/// The defaults keep a synchronous edit under a frame and let background
/// slices run in idle time without starving the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorkConfig {
    /// Synchronous work done while applying an edit.
    pub apply_budget: Duration,
    /// Smallest slice a background wake-up runs, even when idle time is scarce.
    pub min_slice: Duration,
    /// Slice used by timer wake-ups, and the cap for idle wake-ups.
    pub slice: Duration,
    /// Delay before a timer wake-up fires.
    pub min_pause: Duration,
    /// Longest a requested wake-up may be deferred.
    pub max_deferral: Duration,
    /// Background work allowed per `chunk_window`.
    pub chunk_budget: Duration,
    /// Window after which the chunk budget refills.
    pub chunk_window: Duration,
    /// Extra chunk budget granted by each edit.
    pub change_bonus: Duration,
}

impl WorkConfig {
    pub const DEFAULT_APPLY_BUDGET: Duration = Duration::from_millis(20);
    pub const DEFAULT_MIN_SLICE: Duration = Duration::from_millis(25);
    pub const DEFAULT_SLICE: Duration = Duration::from_millis(100);
    pub const DEFAULT_MIN_PAUSE: Duration = Duration::from_millis(100);
    pub const DEFAULT_MAX_DEFERRAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_CHUNK_BUDGET: Duration = Duration::from_secs(3);
    pub const DEFAULT_CHUNK_WINDOW: Duration = Duration::from_secs(30);
    pub const DEFAULT_CHANGE_BONUS: Duration = Duration::from_millis(50);

    pub fn new() -> Self {
        Self {
            apply_budget: Self::DEFAULT_APPLY_BUDGET,
            min_slice: Self::DEFAULT_MIN_SLICE,
            slice: Self::DEFAULT_SLICE,
            min_pause: Self::DEFAULT_MIN_PAUSE,
            max_deferral: Self::DEFAULT_MAX_DEFERRAL,
            chunk_budget: Self::DEFAULT_CHUNK_BUDGET,
            chunk_window: Self::DEFAULT_CHUNK_WINDOW,
            change_bonus: Self::DEFAULT_CHANGE_BONUS,
        }
    }

    pub fn with_apply_budget(mut self, budget: Duration) -> Self {
        self.apply_budget = budget;
        self
    }

    pub fn with_min_slice(mut self, slice: Duration) -> Self {
        self.min_slice = slice;
        self
    }

    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }

    pub fn with_min_pause(mut self, pause: Duration) -> Self {
        self.min_pause = pause;
        self
    }

    pub fn with_max_deferral(mut self, deferral: Duration) -> Self {
        self.max_deferral = deferral;
        self
    }

    /// Set the background budget and the window it refills over.
    pub fn with_chunk_budget(mut self, budget: Duration, window: Duration) -> Self {
        self.chunk_budget = budget;
        self.chunk_window = window;
        self
    }

    pub fn with_change_bonus(mut self, bonus: Duration) -> Self {
        self.change_bonus = bonus;
        self
    }
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self::new()
    }
}
