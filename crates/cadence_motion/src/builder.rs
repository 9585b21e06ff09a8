//! # Motion Builder
//!
//! Configures a checked-out motion leg by leg, then starts it.
//!
//! Two vocabularies drive the same builder. The low-level one mirrors the
//! leg lifecycle (`new_command`, `set_animation`, `set_frames`, `on_update`,
//! `end_command`, `start`). The chainable one reads like a tween
//! (`animate`, `duration`, `on_tick`, `then`, `on_finish`, `yoyo`, `play`)
//! and opens or closes legs for you.
//!
//! Configuration mistakes never fail the chain. They are logged with
//! `tracing::warn!` and the offending call is dropped.

use std::borrow::Cow;

use cadence_core::{CadenceError, Callback, CallbackResult};

use crate::command::Command;
use crate::easing::Easing;
use crate::group::MotionGroup;
use crate::motion::{Motion, MotionFn, MotionHandle};
use crate::tick::MotionTick;

/// Builder for one motion. Dropping it without starting returns the motion
/// and its legs to the group's pools.
pub struct MotionBuilder<'g, S> {
    group: &'g mut MotionGroup<S>,
    motion: Option<Motion<S>>,
    handle: MotionHandle,
}

impl<'g, S> MotionBuilder<'g, S> {
    pub(crate) fn new(group: &'g mut MotionGroup<S>, motion: Motion<S>) -> Self {
        let handle = motion.handle();
        Self {
            group,
            motion: Some(motion),
            handle,
        }
    }

    /// Handle the motion will play under.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> MotionHandle {
        self.handle
    }

    // =========================================================================
    // LEG LIFECYCLE
    // =========================================================================

    /// Opens a new leg with the group's default duration.
    ///
    /// Ignored with a warning while another leg is open.
    #[must_use]
    pub fn new_command(mut self) -> Self {
        if let Some(motion) = self.motion.as_mut() {
            if motion.open.is_some() {
                warn_dropped("new_command", &CadenceError::CommandAlreadyOpen);
            } else {
                motion.open = Some(self.group.commands.get(self.group.default_frames));
            }
        }
        self
    }

    /// Adds a channel to the open leg.
    #[must_use]
    pub fn set_animation(mut self, start: f32, end: f32, easing: Easing) -> Self {
        self.with_open("set_animation", |command| {
            if let Err(error) = command.set_animation(start, end, easing) {
                warn_dropped("set_animation", &error);
            }
        });
        self
    }

    /// Sets the open leg's duration in ticks.
    #[must_use]
    pub fn set_frames(mut self, frames: u32) -> Self {
        self.with_open("set_frames", |command| command.set_frames(frames));
        self
    }

    /// Sets the open leg's per-tick callback.
    #[must_use]
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut MotionTick<'_, S>) -> CallbackResult + 'static,
    {
        let callback: Box<MotionFn<S>> = Box::new(callback);
        self.with_open("on_update", |command| {
            command.on_update(Callback::Direct(callback));
        });
        self
    }

    /// Sets the open leg's per-tick callback to a registered update callback.
    #[must_use]
    pub fn on_update_named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        let callback = Callback::named(name);
        self.with_open("on_update_named", |command| command.on_update(callback));
        self
    }

    /// Closes the open leg and appends it to the program.
    #[must_use]
    pub fn end_command(mut self) -> Self {
        if let Some(motion) = self.motion.as_mut() {
            match motion.open.take() {
                Some(command) => push_leg(motion, command),
                None => warn_dropped("end_command", &CadenceError::NoOpenCommand),
            }
        }
        self
    }

    // =========================================================================
    // PROGRAM SETTINGS
    // =========================================================================

    /// Replays the legs backward after the forward pass.
    #[must_use]
    pub fn reserve(mut self, yoyo: bool) -> Self {
        if let Some(motion) = self.motion.as_mut() {
            motion.yoyo = yoyo;
        }
        self
    }

    /// Runs the whole program `count` more times after the first pass.
    #[must_use]
    pub fn repeat(mut self, count: u32) -> Self {
        if let Some(motion) = self.motion.as_mut() {
            motion.repeat = count;
        }
        self
    }

    /// Sets the completion callback, run once after the last pass.
    #[must_use]
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut MotionTick<'_, S>) -> CallbackResult + 'static,
    {
        let callback: Box<MotionFn<S>> = Box::new(callback);
        if let Some(motion) = self.motion.as_mut() {
            motion.on_complete = Some(Callback::Direct(callback));
        }
        self
    }

    /// Sets the completion callback to a registered completion callback.
    #[must_use]
    pub fn on_complete_named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        if let Some(motion) = self.motion.as_mut() {
            motion.on_complete = Some(Callback::named(name));
        }
        self
    }

    /// Parks the motion when it finishes instead of returning it to the
    /// pool, so it can be replayed with [`MotionGroup::restart`].
    #[must_use]
    pub fn manual_return(mut self) -> Self {
        if let Some(motion) = self.motion.as_mut() {
            motion.auto_return = false;
        }
        self
    }

    /// Starts the motion. It plays from the group's next update.
    ///
    /// An open leg is closed first. A motion without legs is returned to the
    /// pool with a warning and its handle never becomes active.
    pub fn start(mut self) -> MotionHandle {
        let handle = self.handle;
        let Some(mut motion) = self.motion.take() else {
            return handle;
        };
        if let Some(command) = motion.open.take() {
            push_leg(&mut motion, command);
        }
        if motion.commands.is_empty() {
            warn_dropped("start", &CadenceError::EmptyProgram);
            self.group.recycle(motion);
        } else {
            self.group.launch(motion);
        }
        handle
    }

    // =========================================================================
    // CHAINABLE TWEEN API
    // =========================================================================

    /// Adds a channel, opening a leg first if none is open.
    ///
    /// An unknown easing name falls back to linear.
    #[must_use]
    pub fn animate(self, start: f32, end: f32, easing: &str) -> Self {
        let builder = if self.has_open() { self } else { self.new_command() };
        builder.set_animation(start, end, Easing::from_name_or_linear(easing))
    }

    /// Alias of [`MotionBuilder::set_frames`].
    #[must_use]
    pub fn duration(self, frames: u32) -> Self {
        self.set_frames(frames)
    }

    /// Alias of [`MotionBuilder::on_update`].
    #[must_use]
    pub fn on_tick<F>(self, callback: F) -> Self
    where
        F: FnMut(&mut MotionTick<'_, S>) -> CallbackResult + 'static,
    {
        self.on_update(callback)
    }

    /// Closes the open leg. The next `animate` opens a new one.
    #[must_use]
    pub fn then(self) -> Self {
        self.end_command()
    }

    /// Alias of [`MotionBuilder::on_complete`].
    #[must_use]
    pub fn on_finish<F>(self, callback: F) -> Self
    where
        F: FnMut(&mut MotionTick<'_, S>) -> CallbackResult + 'static,
    {
        self.on_complete(callback)
    }

    /// Alias of `reserve(true)`.
    #[must_use]
    pub fn yoyo(self) -> Self {
        self.reserve(true)
    }

    /// Alias of [`MotionBuilder::start`].
    pub fn play(self) -> MotionHandle {
        self.start()
    }

    fn has_open(&self) -> bool {
        self.motion.as_ref().is_some_and(|motion| motion.open.is_some())
    }

    fn with_open(&mut self, op: &'static str, apply: impl FnOnce(&mut Command<S>)) {
        match self.motion.as_mut().and_then(|motion| motion.open.as_mut()) {
            Some(command) => apply(command),
            None => warn_dropped(op, &CadenceError::NoOpenCommand),
        }
    }
}

impl<S> Drop for MotionBuilder<'_, S> {
    fn drop(&mut self) {
        if let Some(motion) = self.motion.take() {
            tracing::debug!(motion = self.handle.id(), "unstarted motion returned to pool");
            self.group.recycle(motion);
        }
    }
}

impl<S> std::fmt::Debug for MotionBuilder<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionBuilder")
            .field("handle", &self.handle)
            .field("motion", &self.motion)
            .finish_non_exhaustive()
    }
}

fn push_leg<S>(motion: &mut Motion<S>, command: Command<S>) {
    if command.channels() == 0 {
        tracing::debug!(motion = motion.handle().id(), "leg without channels added");
    }
    motion.commands.push(command);
}

fn warn_dropped(op: &'static str, error: &CadenceError) {
    tracing::warn!(op, %error, "motion builder call dropped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> MotionGroup<()> {
        MotionGroup::new(8, 4, 30)
    }

    #[test]
    fn test_fresh_leg_uses_default_frames() {
        let mut group = group();
        let handle = group.get_motion().animate(0.0, 1.0, "linear").play();
        let mut ticks = 0;
        while group.is_active(handle) {
            group.update(&mut ());
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks, 31);
    }

    #[test]
    fn test_start_closes_open_leg() {
        let mut group = group();
        let handle = group.new_command().set_animation(0.0, 1.0, Easing::Linear).start();
        assert!(group.is_active(handle));
        assert_eq!(group.stats().commands.in_use, 1);
    }

    #[test]
    fn test_empty_program_never_plays() {
        let mut group = group();
        let handle = group.get_motion().on_finish(|_: &mut MotionTick<'_, ()>| Ok(())).play();
        assert!(!group.is_active(handle));
        assert_eq!(group.stats().motions.in_use, 0);
    }

    #[test]
    fn test_misuse_is_absorbed() {
        let mut group = group();
        let handle = group
            .get_motion()
            .set_frames(5)
            .end_command()
            .new_command()
            .new_command()
            .set_animation(1.0, 2.0, Easing::Linear)
            .play();

        group.update(&mut ());
        assert!(group.is_active(handle));
        assert_eq!(group.stats().commands.in_use, 1);
    }

    #[test]
    fn test_ninth_channel_dropped_by_builder() {
        let mut group = group();
        let mut builder = group.get_motion();
        for i in 0..9 {
            builder = builder.animate(0.0, i as f32, "linear");
        }
        let handle = builder.duration(1).play();
        group.update(&mut ());
        assert_eq!(group.values(handle).map(<[f32]>::len), Some(8));
    }

    #[test]
    fn test_unknown_easing_falls_back_to_linear() {
        let mut group = group();
        let handle = group.get_motion().animate(0.0, 4.0, "wobble").duration(4).play();
        group.update(&mut ());
        assert_eq!(group.values(handle).map(<[f32]>::to_vec), Some(vec![1.0]));
    }
}
