//! Callback-side view of the scheduler during one firing.

use cadence_core::CallbackResult;

use crate::registry::{Registration, Scheduler};
use crate::runner::RunnerHandle;

/// Handed to a runner's task every time it fires.
///
/// Gives the task its environment and lets it schedule or cancel other
/// runners. Runners scheduled here are first visited on the next tick.
pub struct Tick<'a, E> {
    scheduler: &'a mut Scheduler<E>,
    env: &'a mut E,
    handle: RunnerHandle,
    countdown: Option<u32>,
}

impl<'a, E> Tick<'a, E> {
    pub(crate) fn new(
        scheduler: &'a mut Scheduler<E>,
        env: &'a mut E,
        handle: RunnerHandle,
        countdown: Option<u32>,
    ) -> Self {
        Self {
            scheduler,
            env,
            handle,
            countdown,
        }
    }

    /// The environment the scheduler was updated with.
    #[inline]
    pub fn env(&mut self) -> &mut E {
        &mut *self.env
    }

    /// Handle of the firing runner.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> RunnerHandle {
        self.handle
    }

    /// Firings left after this one, for limited runners.
    #[inline]
    #[must_use]
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    /// Scheduler ticks counted so far, including the current one.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.scheduler.tick_count()
    }

    /// Registers another runner. It is first visited on the next tick.
    pub fn schedule<F>(
        &mut self,
        task: F,
        wait: u32,
        repeat_limit: Option<u32>,
    ) -> Registration<'_, E>
    where
        F: FnMut(&mut Tick<'_, E>) -> CallbackResult + 'static,
    {
        self.scheduler.on(task, wait, repeat_limit)
    }

    /// Cancels a runner, running its completion hook.
    pub fn cancel(&mut self, handle: RunnerHandle) -> bool {
        self.scheduler.off(handle, &mut *self.env)
    }

    /// Cancels the firing runner once this call returns.
    pub fn cancel_self(&mut self) {
        let handle = self.handle;
        let _ = self.cancel(handle);
    }
}
