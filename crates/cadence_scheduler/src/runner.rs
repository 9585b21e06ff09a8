//! # Runners
//!
//! One scheduled task and its timing state machine.

use cadence_core::{Callback, CallbackResult, Poolable};

use crate::tick::Tick;

/// Task body. Called with a [`Tick`] every time the runner fires.
pub type TaskFn<E> = dyn FnMut(&mut Tick<'_, E>) -> CallbackResult;

/// Completion hook. Called once when the runner leaves the active list.
pub type HookFn<E> = dyn FnMut(&mut E) -> CallbackResult;

/// Stable identity of a registered runner.
///
/// Handles are never reused, so a stale handle simply finds nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunnerHandle {
    id: u64,
}

impl RunnerHandle {
    pub(crate) const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }
}

/// The four timing semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunnerKind {
    /// Every `wait` ticks, forever.
    InfinitePeriodic,
    /// Every tick, forever.
    InfinitePerTick,
    /// Every `wait` ticks, a fixed number of times.
    LimitedPeriodic,
    /// Every tick, a fixed number of times.
    LimitedPerTick,
}

impl RunnerKind {
    /// All kinds, in sub-pool order.
    pub const ALL: [Self; 4] = [
        Self::InfinitePeriodic,
        Self::InfinitePerTick,
        Self::LimitedPeriodic,
        Self::LimitedPerTick,
    ];

    /// Picks the kind for a registration.
    #[must_use]
    pub const fn select(wait: u32, repeat_limit: Option<u32>) -> Self {
        match (wait > 0, repeat_limit.is_some()) {
            (true, false) => Self::InfinitePeriodic,
            (false, false) => Self::InfinitePerTick,
            (true, true) => Self::LimitedPeriodic,
            (false, true) => Self::LimitedPerTick,
        }
    }

    /// Index of this kind's sub-pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::InfinitePeriodic => 0,
            Self::InfinitePerTick => 1,
            Self::LimitedPeriodic => 2,
            Self::LimitedPerTick => 3,
        }
    }

    /// Returns true for kinds that cancel themselves.
    #[inline]
    #[must_use]
    pub const fn is_limited(self) -> bool {
        matches!(self, Self::LimitedPeriodic | Self::LimitedPerTick)
    }

    /// Short name used for pools and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InfinitePeriodic => "runner.infinite_periodic",
            Self::InfinitePerTick => "runner.infinite_per_tick",
            Self::LimitedPeriodic => "runner.limited_periodic",
            Self::LimitedPerTick => "runner.limited_per_tick",
        }
    }
}

/// A firing decided by [`Runner::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Firing {
    /// Firings left after this one. `None` for infinite kinds.
    pub countdown: Option<u32>,
}

/// A scheduled task.
pub struct Runner<E> {
    /// Identity, assigned on checkout.
    pub(crate) handle: RunnerHandle,
    /// Timing semantics.
    pub(crate) kind: RunnerKind,
    /// Sub-pool this runner was drawn from. Unchanged when a restart picks
    /// a different kind.
    pub(crate) pool_kind: RunnerKind,
    /// Ticks between firings for periodic kinds.
    wait: u32,
    /// Ticks counted since the last firing.
    counter: u32,
    /// Configured number of firings for limited kinds.
    repeat_limit: u32,
    /// Firings left for limited kinds.
    remaining: u32,
    /// Task body.
    pub(crate) callback: Option<Box<TaskFn<E>>>,
    /// Completion hook.
    pub(crate) on_complete: Option<Callback<HookFn<E>>>,
    /// Return to the pool on cancellation instead of parking.
    pub(crate) auto_return: bool,
}

impl<E> Runner<E> {
    /// Builds a blank runner. Used as the pool factory.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            handle: RunnerHandle::new(0),
            kind: RunnerKind::InfinitePerTick,
            pool_kind: RunnerKind::InfinitePerTick,
            wait: 0,
            counter: 0,
            repeat_limit: 0,
            remaining: 0,
            callback: None,
            on_complete: None,
            auto_return: true,
        }
    }

    /// Returns the runner's handle.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> RunnerHandle {
        self.handle
    }

    /// Returns the runner's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> RunnerKind {
        self.kind
    }

    /// Ticks between firings.
    #[inline]
    #[must_use]
    pub const fn wait(&self) -> u32 {
        self.wait
    }

    /// Firings left for limited kinds.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns true once a limited runner has used its whole budget.
    #[inline]
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        self.kind.is_limited() && self.remaining == 0
    }

    /// Sets timing parameters and rewinds the counters.
    pub(crate) fn configure(&mut self, wait: u32, repeat_limit: Option<u32>) {
        let repeat_limit = match repeat_limit {
            Some(0) => {
                tracing::warn!(runner = self.handle.id, "repeat limit of zero raised to one");
                Some(1)
            }
            other => other,
        };
        self.kind = RunnerKind::select(wait, repeat_limit);
        self.wait = wait;
        self.repeat_limit = repeat_limit.unwrap_or(0);
        self.rewind();
    }

    /// Resets the running counters to their configured start.
    pub(crate) fn rewind(&mut self) {
        self.counter = 0;
        self.remaining = self.repeat_limit;
    }

    /// Advances one tick and reports whether the runner fires.
    pub(crate) fn advance(&mut self) -> Option<Firing> {
        match self.kind {
            RunnerKind::InfinitePerTick => Some(Firing { countdown: None }),
            RunnerKind::InfinitePeriodic => {
                self.step_period().then_some(Firing { countdown: None })
            }
            RunnerKind::LimitedPeriodic => {
                if !self.step_period() {
                    return None;
                }
                self.remaining = self.remaining.saturating_sub(1);
                Some(Firing {
                    countdown: Some(self.remaining),
                })
            }
            RunnerKind::LimitedPerTick => {
                self.remaining = self.remaining.saturating_sub(1);
                Some(Firing {
                    countdown: Some(self.remaining),
                })
            }
        }
    }

    fn step_period(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.wait {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

impl<E> Poolable for Runner<E> {
    type Args = RunnerHandle;

    fn init(&mut self, handle: RunnerHandle) {
        self.handle = handle;
        self.auto_return = true;
    }

    fn reset(&mut self) {
        self.callback = None;
        self.on_complete = None;
        self.counter = 0;
        self.remaining = 0;
        self.repeat_limit = 0;
        self.wait = 0;
    }
}

impl<E> std::fmt::Debug for Runner<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("wait", &self.wait)
            .field("counter", &self.counter)
            .field("remaining", &self.remaining)
            .field("auto_return", &self.auto_return)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(wait: u32, repeat_limit: Option<u32>) -> Runner<()> {
        let mut runner = Runner::blank();
        runner.init(RunnerHandle::new(1));
        runner.configure(wait, repeat_limit);
        runner
    }

    #[test]
    fn test_kind_selection() {
        assert_eq!(RunnerKind::select(5, None), RunnerKind::InfinitePeriodic);
        assert_eq!(RunnerKind::select(0, None), RunnerKind::InfinitePerTick);
        assert_eq!(RunnerKind::select(5, Some(2)), RunnerKind::LimitedPeriodic);
        assert_eq!(RunnerKind::select(0, Some(2)), RunnerKind::LimitedPerTick);
    }

    #[test]
    fn test_periodic_fires_on_multiples() {
        let mut runner = configured(5, None);
        let fired: Vec<u32> = (1..=15).filter(|_| runner.advance().is_some()).collect();
        assert_eq!(fired, vec![5, 10, 15]);
    }

    #[test]
    fn test_limited_per_tick_counts_down() {
        let mut runner = configured(0, Some(3));
        let countdowns: Vec<_> = (0..3)
            .filter_map(|_| runner.advance())
            .map(|f| f.countdown)
            .collect();
        assert_eq!(countdowns, vec![Some(2), Some(1), Some(0)]);
        assert!(runner.exhausted());
    }

    #[test]
    fn test_limited_periodic_budget() {
        let mut runner = configured(2, Some(2));
        assert!(runner.advance().is_none());
        assert_eq!(runner.advance(), Some(Firing { countdown: Some(1) }));
        assert!(runner.advance().is_none());
        assert_eq!(runner.advance(), Some(Firing { countdown: Some(0) }));
        assert!(runner.exhausted());
    }

    #[test]
    fn test_zero_repeat_limit_is_raised() {
        let runner = configured(0, Some(0));
        assert_eq!(runner.kind(), RunnerKind::LimitedPerTick);
        assert_eq!(runner.remaining(), 1);
    }

    #[test]
    fn test_reset_drops_callbacks() {
        let mut runner = configured(0, None);
        let task: Box<TaskFn<()>> = Box::new(|_: &mut Tick<'_, ()>| Ok(()));
        runner.callback = Some(task);
        runner.on_complete = Some(Callback::named("done"));
        runner.reset();
        assert!(runner.callback.is_none());
        assert!(runner.on_complete.is_none());
    }
}
