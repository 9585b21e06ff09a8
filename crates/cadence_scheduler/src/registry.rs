//! # Runner Registry
//!
//! The frame scheduler. Owns the active runner list, one pool per runner
//! kind, the parked (manual-return) runners and the completion-hook table.
//!
//! ## Tick Algorithm
//!
//! ```text
//! update(env):
//!   n = active.len()                       snapshot
//!   for i in 0..n:
//!     runner = active.take(i)              tombstone => skip
//!     advance counters; not firing => put back
//!     fire task (guarded)                  may schedule / cancel
//!     cancelled | exhausted => off()       hook, then pool or park
//!     panicked              => retire      no hook
//!     otherwise             => put back
//!   active.compact()
//! ```

use std::borrow::Cow;

use cadence_core::{guarded, ActiveList, Callback, CallbackResult, DispatchTable, Outcome, Pool, PoolStats};
use cadence_shared::DEFAULT_RUNNER_CAPACITY;

use crate::runner::{HookFn, Runner, RunnerHandle, RunnerKind};
use crate::tick::Tick;

/// Scheduler accounting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Runners in the active list.
    pub active: usize,
    /// Parked manual-return runners.
    pub detached: usize,
    /// Completed calls to `update`.
    pub ticks: u64,
    /// Sub-pool accounting, indexed by [`RunnerKind::index`].
    pub pools: [PoolStats; 4],
}

/// The runner being dispatched right now.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    handle: RunnerHandle,
    cancelled: bool,
}

/// Frame-counted task scheduler.
///
/// `E` is the environment every task and completion hook receives.
pub struct Scheduler<E> {
    /// Scheduled runners in registration order.
    active: ActiveList<Runner<E>>,
    /// One pool per runner kind.
    pools: [Pool<Runner<E>>; 4],
    /// Cancelled manual-return runners awaiting `restart` or `release`.
    detached: Vec<Runner<E>>,
    /// Named completion hooks.
    hooks: DispatchTable<HookFn<E>>,
    /// Next handle id. Never reused.
    next_id: u64,
    /// Runner whose task is executing.
    in_flight: Option<InFlight>,
    /// True while `update` holds slot indices.
    dispatching: bool,
    /// Calls to `update`.
    tick_count: u64,
}

impl<E> Scheduler<E> {
    /// Creates a scheduler keeping up to `runner_capacity` idle runners per kind.
    #[must_use]
    pub fn new(runner_capacity: usize) -> Self {
        Self {
            active: ActiveList::with_capacity(runner_capacity),
            pools: RunnerKind::ALL.map(|kind| Pool::new(kind.name(), runner_capacity, Runner::blank)),
            detached: Vec::new(),
            hooks: DispatchTable::new(),
            next_id: 1,
            in_flight: None,
            dispatching: false,
            tick_count: 0,
        }
    }

    /// Builds `per_kind` idle runners in every sub-pool. Returns how many were built.
    pub fn pre_allocate(&mut self, per_kind: usize) -> usize {
        self.pools.iter_mut().map(|pool| pool.pre_allocate(per_kind)).sum()
    }

    /// Registers a task.
    ///
    /// The kind is picked from `wait` and `repeat_limit` (see the crate docs).
    /// The runner joins the end of the active list with rewound counters, so
    /// a registration made during [`Scheduler::update`] is first visited on
    /// the next call.
    pub fn on<F>(&mut self, task: F, wait: u32, repeat_limit: Option<u32>) -> Registration<'_, E>
    where
        F: FnMut(&mut Tick<'_, E>) -> CallbackResult + 'static,
    {
        let handle = RunnerHandle::new(self.next_id);
        self.next_id += 1;

        let kind = RunnerKind::select(wait, repeat_limit);
        let mut runner = self.pools[kind.index()].get(handle);
        runner.pool_kind = kind;
        runner.configure(wait, repeat_limit);
        runner.callback = Some(Box::new(task));
        self.active.push(runner);

        tracing::trace!(runner = handle.id(), ?kind, wait, "runner registered");
        Registration {
            scheduler: self,
            handle,
        }
    }

    /// Cancels a runner.
    ///
    /// Runs its completion hook, removes it from the active list and returns
    /// it to its sub-pool, or parks it if it opted out of auto-return.
    /// Cancelling the runner whose task is executing takes effect when the
    /// task returns. Returns false if the handle is not active.
    pub fn off(&mut self, handle: RunnerHandle, env: &mut E) -> bool {
        if let Some(in_flight) = self.in_flight.as_mut() {
            if in_flight.handle == handle {
                in_flight.cancelled = true;
                return true;
            }
        }
        let Some(runner) = self
            .active
            .position(|runner| runner.handle == handle)
            .and_then(|index| self.active.take(index))
        else {
            return false;
        };
        if !self.dispatching {
            self.active.compact();
        }
        self.retire(runner, env, true);
        true
    }

    /// Reconfigures a runner and re-registers it with rewound counters.
    ///
    /// A parked runner rejoins the end of the active list. An active runner
    /// is reconfigured in place. Returns false if the handle is unknown.
    pub fn restart(&mut self, handle: RunnerHandle, wait: u32, repeat_limit: Option<u32>) -> bool {
        if let Some(runner) = self
            .active
            .position(|runner| runner.handle == handle)
            .and_then(|index| self.active.get_mut(index))
        {
            runner.configure(wait, repeat_limit);
            return true;
        }
        let Some(position) = self.detached.iter().position(|runner| runner.handle == handle) else {
            tracing::warn!(runner = handle.id(), "restart of a runner that is neither active nor parked");
            return false;
        };
        let mut runner = self.detached.swap_remove(position);
        runner.configure(wait, repeat_limit);
        self.active.push(runner);
        true
    }

    /// Returns a parked runner to its sub-pool.
    pub fn release(&mut self, handle: RunnerHandle) -> bool {
        let Some(position) = self.detached.iter().position(|runner| runner.handle == handle) else {
            return false;
        };
        let runner = self.detached.swap_remove(position);
        self.pools[runner.pool_kind.index()].release(runner);
        true
    }

    /// Registers a named completion hook for [`Registration::on_complete_named`].
    pub fn register_hook<H>(&mut self, name: impl Into<Cow<'static, str>>, hook: H)
    where
        H: FnMut(&mut E) -> CallbackResult + 'static,
    {
        let hook: Box<HookFn<E>> = Box::new(hook);
        if self.hooks.register(name, hook).is_some() {
            tracing::debug!("completion hook replaced");
        }
    }

    /// Advances every runner by one tick.
    ///
    /// Runners are visited once each, in registration order. Runners added
    /// during this call wait for the next one; runners cancelled during this
    /// call are skipped. A failing task never stops the rest of the tick: an
    /// `Err` is logged and the runner stays scheduled, a panic is logged and
    /// the runner is retired without its completion hook.
    pub fn update(&mut self, env: &mut E) {
        self.tick_count += 1;
        self.dispatching = true;

        let snapshot = self.active.len();
        for index in 0..snapshot {
            let Some(mut runner) = self.active.take(index) else {
                continue;
            };
            let Some(firing) = runner.advance() else {
                self.put_back(index, runner);
                continue;
            };

            let handle = runner.handle;
            self.in_flight = Some(InFlight {
                handle,
                cancelled: false,
            });
            let outcome = match runner.callback.as_mut() {
                Some(task) => {
                    let mut tick = Tick::new(self, env, handle, firing.countdown);
                    guarded(runner.kind.name(), || task(&mut tick))
                }
                None => Outcome::Completed,
            };
            let cancelled = self.in_flight.take().is_some_and(|f| f.cancelled);

            if outcome.panicked() {
                self.retire(runner, env, false);
            } else if cancelled || runner.exhausted() {
                self.retire(runner, env, true);
            } else {
                self.put_back(index, runner);
            }
        }

        self.dispatching = false;
        self.active.compact();
    }

    /// Number of scheduled runners.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.live()
    }

    /// Returns true while the runner is scheduled.
    #[must_use]
    pub fn is_active(&self, handle: RunnerHandle) -> bool {
        if let Some(in_flight) = self.in_flight {
            if in_flight.handle == handle {
                return !in_flight.cancelled;
            }
        }
        self.active.position(|runner| runner.handle == handle).is_some()
    }

    /// Returns true while the runner is parked after cancellation.
    #[must_use]
    pub fn is_detached(&self, handle: RunnerHandle) -> bool {
        self.detached.iter().any(|runner| runner.handle == handle)
    }

    /// Calls to [`Scheduler::update`] so far.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns the scheduler's accounting.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            active: self.active.live(),
            detached: self.detached.len(),
            ticks: self.tick_count,
            pools: [
                self.pools[0].stats(),
                self.pools[1].stats(),
                self.pools[2].stats(),
                self.pools[3].stats(),
            ],
        }
    }

    fn put_back(&mut self, index: usize, runner: Runner<E>) {
        if let Err(runner) = self.active.restore(index, runner) {
            tracing::warn!(runner = runner.handle.id(), "slot reused mid-tick, runner re-queued");
            self.active.push(runner);
        }
    }

    fn retire(&mut self, mut runner: Runner<E>, env: &mut E, run_hook: bool) {
        if run_hook {
            if let Some(hook) = runner.on_complete.as_mut() {
                self.call_hook(hook, env);
            }
        }
        tracing::trace!(runner = runner.handle.id(), parked = !runner.auto_return, "runner retired");
        if runner.auto_return {
            self.pools[runner.pool_kind.index()].release(runner);
        } else {
            self.detached.push(runner);
        }
    }

    fn call_hook(&mut self, hook: &mut Callback<HookFn<E>>, env: &mut E) {
        match hook {
            Callback::Direct(hook) => {
                let _ = guarded("runner.on_complete", || hook(env));
            }
            Callback::Named(name) => {
                let name: &str = &**name;
                if let Some(mut lease) = self.hooks.take(name) {
                    let _ = guarded(name, || (lease.1)(env));
                    self.hooks.restore(lease);
                }
            }
        }
    }

    fn runner_mut(&mut self, handle: RunnerHandle) -> Option<&mut Runner<E>> {
        match self.active.position(|runner| runner.handle == handle) {
            Some(index) => self.active.get_mut(index),
            None => self.detached.iter_mut().find(|runner| runner.handle == handle),
        }
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new(DEFAULT_RUNNER_CAPACITY)
    }
}

impl<E> std::fmt::Debug for Scheduler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("stats", &self.stats())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Fluent view of a fresh registration.
pub struct Registration<'a, E> {
    scheduler: &'a mut Scheduler<E>,
    handle: RunnerHandle,
}

impl<'a, E> Registration<'a, E> {
    /// Handle of the registered runner.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> RunnerHandle {
        self.handle
    }

    /// Sets a completion hook, run once when the runner is cancelled or
    /// uses up its repeat budget.
    #[must_use]
    pub fn on_complete<H>(self, hook: H) -> Self
    where
        H: FnMut(&mut E) -> CallbackResult + 'static,
    {
        let hook: Box<HookFn<E>> = Box::new(hook);
        self.set_hook(Callback::Direct(hook))
    }

    /// Sets a completion hook registered with [`Scheduler::register_hook`].
    #[must_use]
    pub fn on_complete_named(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.set_hook(Callback::named(name))
    }

    /// Parks the runner on cancellation instead of returning it to its pool,
    /// so it can be restarted later.
    #[must_use]
    pub fn manual_return(self) -> Self {
        if let Some(runner) = self.scheduler.runner_mut(self.handle) {
            runner.auto_return = false;
        }
        self
    }

    fn set_hook(self, hook: Callback<HookFn<E>>) -> Self {
        if let Some(runner) = self.scheduler.runner_mut(self.handle) {
            runner.on_complete = Some(hook);
        }
        self
    }
}

impl<E> From<Registration<'_, E>> for RunnerHandle {
    fn from(registration: Registration<'_, E>) -> Self {
        registration.handle
    }
}
