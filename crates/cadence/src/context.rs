//! # Scheduling Context
//!
//! One value owning the frame scheduler, the motion group and the
//! application state they drive. The host render loop ticks it:
//!
//! ```text
//! every displayed frame:
//!   scheduler_tick()   deferred and periodic tasks   (env = Stage<S>)
//!   motion_tick()      tweens                        (state = S)
//! ```
//!
//! Scheduler tasks see the whole [`Stage`], so a task can start tweens.
//! Motion callbacks see the application state only.

use std::borrow::Cow;

use cadence_core::CallbackResult;
use cadence_motion::{GroupStats, MotionBuilder, MotionGroup, MotionHandle};
use cadence_scheduler::{Registration, RunnerHandle, Scheduler, SchedulerStats, Tick};

use crate::config::CadenceConfig;

/// Everything scheduler tasks can touch.
#[derive(Debug)]
pub struct Stage<S> {
    /// Tween engine.
    pub motions: MotionGroup<S>,
    /// Application state.
    pub state: S,
}

/// Combined accounting of both engines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CadenceStats {
    /// Scheduler ticks run.
    pub frame: u64,
    /// Scheduler accounting.
    pub scheduler: SchedulerStats,
    /// Motion group accounting.
    pub motions: GroupStats,
}

/// The frame engine.
#[derive(Debug)]
pub struct Cadence<S> {
    scheduler: Scheduler<Stage<S>>,
    stage: Stage<S>,
}

impl<S> Cadence<S> {
    /// Builds the engine around `state`.
    ///
    /// Pools are filled up front when `config.pools.pre_allocate` is set.
    #[must_use]
    pub fn new(config: &CadenceConfig, state: S) -> Self {
        let pools = &config.pools;
        let mut scheduler = Scheduler::new(pools.runner_capacity);
        let mut motions = MotionGroup::new(
            pools.command_capacity,
            pools.motion_capacity,
            config.motion.default_frames,
        );
        if pools.pre_allocate {
            let built = scheduler.pre_allocate(pools.runner_capacity) + motions.pre_allocate();
            tracing::debug!(built, "pools pre-allocated");
        }
        Self {
            scheduler,
            stage: Stage { motions, state },
        }
    }

    /// Builds the engine with the default configuration.
    #[must_use]
    pub fn with_state(state: S) -> Self {
        Self::new(&CadenceConfig::default(), state)
    }

    // =========================================================================
    // FRAME ENTRY POINTS
    // =========================================================================

    /// Runs one scheduler tick.
    pub fn scheduler_tick(&mut self) {
        self.scheduler.update(&mut self.stage);
    }

    /// Runs one motion tick.
    pub fn motion_tick(&mut self) {
        let Stage { motions, state } = &mut self.stage;
        motions.update(state);
    }

    /// Runs [`Cadence::scheduler_tick`] then [`Cadence::motion_tick`].
    pub fn tick(&mut self) {
        self.scheduler_tick();
        self.motion_tick();
    }

    /// Scheduler ticks run so far.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.scheduler.tick_count()
    }

    // =========================================================================
    // SCHEDULING
    // =========================================================================

    /// Schedules a task and returns its handle.
    ///
    /// `wait` is the number of ticks between firings, 0 meaning every tick.
    /// `repeat_limit` bounds the number of firings, `None` meaning forever.
    pub fn schedule<F>(&mut self, task: F, wait: u32, repeat_limit: Option<u32>) -> RunnerHandle
    where
        F: FnMut(&mut Tick<'_, Stage<S>>) -> CallbackResult + 'static,
    {
        self.scheduler.on(task, wait, repeat_limit).handle()
    }

    /// Schedules a task and returns its registration for further setup.
    pub fn schedule_with<F>(
        &mut self,
        task: F,
        wait: u32,
        repeat_limit: Option<u32>,
    ) -> Registration<'_, Stage<S>>
    where
        F: FnMut(&mut Tick<'_, Stage<S>>) -> CallbackResult + 'static,
    {
        self.scheduler.on(task, wait, repeat_limit)
    }

    /// Cancels a task, running its completion hook.
    pub fn cancel(&mut self, handle: RunnerHandle) -> bool {
        self.scheduler.off(handle, &mut self.stage)
    }

    /// Reconfigures a task and re-registers it with rewound counters.
    pub fn restart_task(&mut self, handle: RunnerHandle, wait: u32, repeat_limit: Option<u32>) -> bool {
        self.scheduler.restart(handle, wait, repeat_limit)
    }

    /// Returns a parked manual-return task to its pool.
    pub fn release_task(&mut self, handle: RunnerHandle) -> bool {
        self.scheduler.release(handle)
    }

    /// Registers a named completion hook for tasks.
    pub fn register_hook<H>(&mut self, name: impl Into<Cow<'static, str>>, hook: H)
    where
        H: FnMut(&mut Stage<S>) -> CallbackResult + 'static,
    {
        self.scheduler.register_hook(name, hook);
    }

    /// Returns true while the task is scheduled.
    #[must_use]
    pub fn is_scheduled(&self, handle: RunnerHandle) -> bool {
        self.scheduler.is_active(handle)
    }

    // =========================================================================
    // TWEENS
    // =========================================================================

    /// Starts building a tween. It plays from the next motion tick.
    pub fn tween(&mut self) -> MotionBuilder<'_, S> {
        self.stage.motions.get_motion()
    }

    /// Stops a tween without running its completion callback.
    pub fn stop_motion(&mut self, handle: MotionHandle) -> bool {
        self.stage.motions.return_motion(handle)
    }

    /// The motion group, for named callbacks, restarts and queries.
    #[inline]
    pub fn motions(&mut self) -> &mut MotionGroup<S> {
        &mut self.stage.motions
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Application state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &S {
        &self.stage.state
    }

    /// Application state, mutably.
    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.stage.state
    }

    /// Consumes the engine and returns the application state.
    #[must_use]
    pub fn into_state(self) -> S {
        self.stage.state
    }

    /// Returns the accounting of both engines.
    #[must_use]
    pub fn stats(&self) -> CadenceStats {
        CadenceStats {
            frame: self.scheduler.tick_count(),
            scheduler: self.scheduler.stats(),
            motions: self.stage.motions.stats(),
        }
    }
}

impl<S: Default> Default for Cadence<S> {
    fn default() -> Self {
        Self::with_state(S::default())
    }
}
