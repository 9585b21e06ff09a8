//! Callback-side view of a motion group during one motion callback.

use crate::group::MotionGroup;
use crate::motion::MotionHandle;

/// Handed to leg update and motion completion callbacks.
pub struct MotionTick<'a, S> {
    group: &'a mut MotionGroup<S>,
    state: &'a mut S,
    values: &'a [f32],
    handle: MotionHandle,
}

impl<'a, S> MotionTick<'a, S> {
    pub(crate) fn new(
        group: &'a mut MotionGroup<S>,
        state: &'a mut S,
        values: &'a [f32],
        handle: MotionHandle,
    ) -> Self {
        Self {
            group,
            state,
            values,
            handle,
        }
    }

    /// The state the group was updated with.
    #[inline]
    pub fn state(&mut self) -> &mut S {
        &mut *self.state
    }

    /// Interpolated values of the current leg, one per channel.
    ///
    /// In a completion callback these are the motion's final values.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        self.values
    }

    /// Handle of the motion being dispatched.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> MotionHandle {
        self.handle
    }

    /// The owning group. Motions started through it play from the next tick.
    #[inline]
    pub fn group(&mut self) -> &mut MotionGroup<S> {
        &mut *self.group
    }

    /// Stops the dispatched motion once this callback returns. Its
    /// completion callback does not run.
    pub fn stop(&mut self) {
        let handle = self.handle;
        let _ = self.group.return_motion(handle);
    }
}
