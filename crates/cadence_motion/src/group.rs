//! # Motion Group
//!
//! Owns the playing motions, the leg and motion pools and the named
//! callback tables. [`MotionGroup::update`] ticks every playing motion once.
//!
//! Dispatch follows the same snapshot rule as the frame scheduler: motions
//! started during an update first play on the next one, and motions stopped
//! during an update are skipped.

use std::borrow::Cow;

use cadence_core::{
    guarded, ActiveList, Callback, CallbackResult, DispatchTable, Outcome, Pool, PoolStats,
};
use cadence_shared::{DEFAULT_COMMAND_CAPACITY, DEFAULT_FRAMES, DEFAULT_MOTION_CAPACITY};

use crate::builder::MotionBuilder;
use crate::command::Command;
use crate::motion::{Motion, MotionFn, MotionHandle, Step};
use crate::tick::MotionTick;

/// Motion group accounting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Playing motions.
    pub active: usize,
    /// Finished manual-return motions.
    pub detached: usize,
    /// Leg pool accounting.
    pub commands: PoolStats,
    /// Motion pool accounting.
    pub motions: PoolStats,
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    handle: MotionHandle,
    stopped: bool,
}

#[derive(Clone, Copy)]
enum Table {
    Update,
    Complete,
}

/// Tween engine ticked once per frame.
///
/// `S` is the state every motion callback receives.
pub struct MotionGroup<S> {
    active: ActiveList<Motion<S>>,
    pub(crate) commands: Pool<Command<S>>,
    motions: Pool<Motion<S>>,
    updates: DispatchTable<MotionFn<S>>,
    completions: DispatchTable<MotionFn<S>>,
    /// Finished manual-return motions awaiting `restart` or `release`.
    detached: Vec<Motion<S>>,
    /// Duration of a fresh leg.
    pub(crate) default_frames: u32,
    next_id: u64,
    in_flight: Option<InFlight>,
    dispatching: bool,
}

impl<S> MotionGroup<S> {
    /// Creates a group.
    ///
    /// # Arguments
    ///
    /// * `command_capacity` - Idle legs kept
    /// * `motion_capacity` - Idle motions kept
    /// * `default_frames` - Duration of a leg that never calls `set_frames`
    #[must_use]
    pub fn new(command_capacity: usize, motion_capacity: usize, default_frames: u32) -> Self {
        Self {
            active: ActiveList::with_capacity(motion_capacity),
            commands: Pool::new("motion.commands", command_capacity, Command::blank),
            motions: Pool::new("motion.motions", motion_capacity, Motion::blank),
            updates: DispatchTable::new(),
            completions: DispatchTable::new(),
            detached: Vec::new(),
            default_frames: default_frames.max(1),
            next_id: 1,
            in_flight: None,
            dispatching: false,
        }
    }

    /// Fills both pools up to their capacity. Returns how many objects were built.
    pub fn pre_allocate(&mut self) -> usize {
        let legs = self.commands.capacity();
        let motions = self.motions.capacity();
        self.commands.pre_allocate(legs) + self.motions.pre_allocate(motions)
    }

    /// Checks out a motion and returns its builder.
    pub fn get_motion(&mut self) -> MotionBuilder<'_, S> {
        let handle = MotionHandle::new(self.next_id);
        self.next_id += 1;
        let motion = self.motions.get(handle);
        MotionBuilder::new(self, motion)
    }

    /// Checks out a motion with its first leg already open.
    pub fn new_command(&mut self) -> MotionBuilder<'_, S> {
        self.get_motion().new_command()
    }

    /// Registers a named leg update callback.
    pub fn register_update<F>(&mut self, name: impl Into<Cow<'static, str>>, callback: F)
    where
        F: FnMut(&mut MotionTick<'_, S>) -> CallbackResult + 'static,
    {
        let callback: Box<MotionFn<S>> = Box::new(callback);
        if self.updates.register(name, callback).is_some() {
            tracing::debug!("update callback replaced");
        }
    }

    /// Registers a named motion completion callback.
    pub fn register_complete<F>(&mut self, name: impl Into<Cow<'static, str>>, callback: F)
    where
        F: FnMut(&mut MotionTick<'_, S>) -> CallbackResult + 'static,
    {
        let callback: Box<MotionFn<S>> = Box::new(callback);
        if self.completions.register(name, callback).is_some() {
            tracing::debug!("completion callback replaced");
        }
    }

    /// Ticks every playing motion once.
    ///
    /// A failing callback never stops the rest of the update: an `Err` is
    /// logged and the motion keeps playing, a panic is logged and the motion
    /// is retired without its completion callback.
    pub fn update(&mut self, state: &mut S) {
        if self.dispatching {
            tracing::warn!("nested motion group update ignored");
            return;
        }
        self.dispatching = true;

        let snapshot = self.active.len();
        for index in 0..snapshot {
            let Some(mut motion) = self.active.take(index) else {
                continue;
            };
            let handle = motion.handle;
            self.in_flight = Some(InFlight {
                handle,
                stopped: false,
            });

            match motion.advance() {
                Step::Frame => {
                    let outcome = self.call_update(&mut motion, state);
                    let stopped = self.in_flight.take().is_some_and(|f| f.stopped);
                    if outcome.panicked() || stopped {
                        self.retire(motion);
                    } else {
                        self.put_back(index, motion);
                    }
                }
                Step::Handover => {
                    self.in_flight = None;
                    self.put_back(index, motion);
                }
                Step::Finished => {
                    let _ = self.call_complete(&mut motion, state);
                    self.in_flight = None;
                    tracing::trace!(motion = handle.id(), "motion finished");
                    self.retire(motion);
                }
            }
        }

        self.dispatching = false;
        self.active.compact();
    }

    /// Stops a playing motion without running its completion callback.
    ///
    /// The motion returns to its pool, or is parked if it opted out of
    /// auto-return. Stopping the motion being dispatched takes effect when
    /// its callback returns. Returns false if the handle is not playing.
    pub fn return_motion(&mut self, handle: MotionHandle) -> bool {
        if let Some(in_flight) = self.in_flight.as_mut() {
            if in_flight.handle == handle {
                in_flight.stopped = true;
                return true;
            }
        }
        let Some(motion) = self
            .active
            .position(|motion| motion.handle == handle)
            .and_then(|index| self.active.take(index))
        else {
            return false;
        };
        if !self.dispatching {
            self.active.compact();
        }
        self.retire(motion);
        true
    }

    /// Plays a motion again from its first leg with its full repeat budget.
    ///
    /// A parked motion rejoins the active list and plays from the next
    /// update. A playing motion is rewound in place. Returns false if the
    /// handle is unknown.
    pub fn restart(&mut self, handle: MotionHandle) -> bool {
        if let Some(motion) = self
            .active
            .position(|motion| motion.handle == handle)
            .and_then(|index| self.active.get_mut(index))
        {
            motion.rewind();
            return true;
        }
        let Some(position) = self.detached.iter().position(|motion| motion.handle == handle) else {
            tracing::warn!(motion = handle.id(), "restart of a motion that is neither playing nor parked");
            return false;
        };
        let mut motion = self.detached.swap_remove(position);
        motion.rewind();
        motion.playing = true;
        self.active.push(motion);
        true
    }

    /// Returns a parked motion and its legs to the pools.
    pub fn release(&mut self, handle: MotionHandle) -> bool {
        let Some(position) = self.detached.iter().position(|motion| motion.handle == handle) else {
            return false;
        };
        let motion = self.detached.swap_remove(position);
        self.recycle(motion);
        true
    }

    /// Returns true while the motion is playing.
    #[must_use]
    pub fn is_active(&self, handle: MotionHandle) -> bool {
        if let Some(in_flight) = self.in_flight {
            if in_flight.handle == handle {
                return !in_flight.stopped;
            }
        }
        self.active.position(|motion| motion.handle == handle).is_some()
    }

    /// Returns true while the motion is parked after finishing.
    #[must_use]
    pub fn is_detached(&self, handle: MotionHandle) -> bool {
        self.detached.iter().any(|motion| motion.handle == handle)
    }

    /// Latest values of a playing or parked motion.
    #[must_use]
    pub fn values(&self, handle: MotionHandle) -> Option<&[f32]> {
        self.active
            .iter()
            .chain(self.detached.iter())
            .find(|motion| motion.handle == handle)
            .map(Motion::values)
    }

    /// Number of playing motions.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.live()
    }

    /// Returns the group's accounting.
    #[must_use]
    pub fn stats(&self) -> GroupStats {
        GroupStats {
            active: self.active.live(),
            detached: self.detached.len(),
            commands: self.commands.stats(),
            motions: self.motions.stats(),
        }
    }

    /// Starts a built motion. Called by the builder.
    pub(crate) fn launch(&mut self, mut motion: Motion<S>) {
        motion.rewind();
        motion.playing = true;
        tracing::trace!(motion = motion.handle.id(), legs = motion.commands.len(), "motion started");
        self.active.push(motion);
    }

    /// Returns a motion and every leg it holds to the pools.
    pub(crate) fn recycle(&mut self, mut motion: Motion<S>) {
        for command in motion.commands.drain(..) {
            self.commands.release(command);
        }
        if let Some(open) = motion.open.take() {
            self.commands.release(open);
        }
        self.motions.release(motion);
    }

    fn retire(&mut self, mut motion: Motion<S>) {
        motion.playing = false;
        if motion.auto_return {
            self.recycle(motion);
        } else {
            self.detached.push(motion);
        }
    }

    fn put_back(&mut self, index: usize, motion: Motion<S>) {
        if let Err(motion) = self.active.restore(index, motion) {
            tracing::warn!(motion = motion.handle.id(), "slot reused mid-update, motion re-queued");
            self.active.push(motion);
        }
    }

    fn call_update(&mut self, motion: &mut Motion<S>, state: &mut S) -> Outcome {
        let handle = motion.handle;
        let values = &motion.values[..motion.working.channels];
        let Some(callback) = motion
            .commands
            .get_mut(motion.cursor)
            .and_then(|command| command.on_update.as_mut())
        else {
            return Outcome::Completed;
        };
        self.invoke(Table::Update, callback, state, values, handle)
    }

    fn call_complete(&mut self, motion: &mut Motion<S>, state: &mut S) -> Outcome {
        let handle = motion.handle;
        let values = &motion.values[..motion.working.channels];
        let Some(callback) = motion.on_complete.as_mut() else {
            return Outcome::Completed;
        };
        self.invoke(Table::Complete, callback, state, values, handle)
    }

    fn invoke(
        &mut self,
        table: Table,
        callback: &mut Callback<MotionFn<S>>,
        state: &mut S,
        values: &[f32],
        handle: MotionHandle,
    ) -> Outcome {
        let task = match table {
            Table::Update => "motion.on_update",
            Table::Complete => "motion.on_complete",
        };
        match callback {
            Callback::Direct(callback) => {
                let mut tick = MotionTick::new(self, state, values, handle);
                guarded(task, || callback(&mut tick))
            }
            Callback::Named(name) => {
                let name: &str = &**name;
                let Some(mut lease) = self.table(table).take(name) else {
                    return Outcome::Completed;
                };
                let outcome = {
                    let mut tick = MotionTick::new(self, state, values, handle);
                    guarded(name, || (lease.1)(&mut tick))
                };
                self.table(table).restore(lease);
                outcome
            }
        }
    }

    fn table(&mut self, table: Table) -> &mut DispatchTable<MotionFn<S>> {
        match table {
            Table::Update => &mut self.updates,
            Table::Complete => &mut self.completions,
        }
    }
}

impl<S> Default for MotionGroup<S> {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_CAPACITY, DEFAULT_MOTION_CAPACITY, DEFAULT_FRAMES)
    }
}

impl<S> std::fmt::Debug for MotionGroup<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionGroup")
            .field("stats", &self.stats())
            .field("default_frames", &self.default_frames)
            .field("updates", &self.updates)
            .field("completions", &self.completions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_shared::approx_eq;

    #[derive(Default)]
    struct Screen {
        alpha: Vec<f32>,
        finished: Vec<(u64, Vec<f32>)>,
    }

    fn track_alpha(tick: &mut MotionTick<'_, Screen>) -> CallbackResult {
        let alpha = tick.values()[0];
        tick.state().alpha.push(alpha);
        Ok(())
    }

    fn record_finish(tick: &mut MotionTick<'_, Screen>) -> CallbackResult {
        let id = tick.handle().id();
        let values = tick.values().to_vec();
        tick.state().finished.push((id, values));
        Ok(())
    }

    fn group() -> MotionGroup<Screen> {
        MotionGroup::new(16, 4, 60)
    }

    #[test]
    fn test_values_stay_between_endpoints() {
        let mut group = group();
        let mut screen = Screen::default();
        let _ = group
            .get_motion()
            .animate(0.2, 0.9, "quad_in_out")
            .duration(17)
            .on_tick(track_alpha)
            .play();

        for _ in 0..20 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha.len(), 17);
        assert!(screen.alpha.iter().all(|a| (0.2..=0.9).contains(a)));
        assert_eq!(screen.alpha.last().copied(), Some(0.9));
        assert!(screen.alpha.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_legs_play_in_order_then_finish() {
        let mut group = group();
        let mut screen = Screen::default();
        let handle = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(2)
            .on_tick(track_alpha)
            .then()
            .animate(5.0, 8.0, "linear")
            .duration(3)
            .on_tick(track_alpha)
            .then()
            .on_finish(record_finish)
            .play();

        for _ in 0..2 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha, vec![0.5, 1.0]);

        group.update(&mut screen);
        assert_eq!(screen.alpha.len(), 2);
        assert_eq!(group.values(handle).map(<[f32]>::to_vec), Some(vec![5.0]));

        for _ in 0..3 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha, vec![0.5, 1.0, 6.0, 7.0, 8.0]);
        assert!(group.is_active(handle));
        assert!(screen.finished.is_empty());

        group.update(&mut screen);
        assert!(!group.is_active(handle));
        assert_eq!(screen.finished, vec![(handle.id(), vec![8.0])]);

        let stats = group.stats();
        assert_eq!(stats.commands.in_use, 0);
        assert_eq!(stats.motions.in_use, 0);
    }

    #[test]
    fn test_yoyo_repeat_terminates() {
        let mut group = group();
        let mut screen = Screen::default();
        let _ = group
            .get_motion()
            .animate(0.0, 1.0, "sine_in_out")
            .duration(4)
            .on_tick(track_alpha)
            .then()
            .animate(1.0, 3.0, "cubic_out")
            .duration(6)
            .on_tick(track_alpha)
            .then()
            .yoyo()
            .repeat(2)
            .on_finish(record_finish)
            .play();

        let expected_frames = (4 + 6) * 2 * 3;
        // Three leg changes per pass, one between passes.
        let handovers = 3 * 3 + 2;
        for _ in 0..expected_frames + handovers {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha.len(), expected_frames);
        assert!(screen.finished.is_empty());

        group.update(&mut screen);
        assert_eq!(screen.finished.len(), 1);
        assert_eq!(screen.finished[0].1, vec![0.0]);
        assert_eq!(group.active_count(), 0);

        for _ in 0..10 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha.len(), expected_frames);
    }

    #[test]
    fn test_values_before_first_update_are_start() {
        let mut group = group();
        let mut screen = Screen::default();
        let handle = group
            .get_motion()
            .animate(5.0, 9.0, "linear")
            .animate(-1.0, 3.0, "quad_in")
            .duration(4)
            .manual_return()
            .play();
        assert_eq!(group.values(handle).map(<[f32]>::to_vec), Some(vec![5.0, -1.0]));

        for _ in 0..5 {
            group.update(&mut screen);
        }
        assert!(group.is_detached(handle));
        assert_eq!(group.values(handle).map(<[f32]>::to_vec), Some(vec![9.0, 3.0]));

        assert!(group.restart(handle));
        assert_eq!(group.values(handle).map(<[f32]>::to_vec), Some(vec![5.0, -1.0]));
    }

    #[test]
    fn test_channels_interpolate_independently() {
        let mut group = group();
        let mut screen = Screen::default();
        let handle = group
            .get_motion()
            .animate(0.0, 10.0, "linear")
            .animate(100.0, 0.0, "linear")
            .duration(4)
            .play();

        group.update(&mut screen);
        let values = group.values(handle).map(<[f32]>::to_vec);
        assert_eq!(values, Some(vec![2.5, 75.0]));
    }

    #[test]
    fn test_stop_from_callback() {
        let mut group = group();
        let mut screen = Screen::default();
        let handle = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(10)
            .on_tick(|tick: &mut MotionTick<'_, Screen>| {
                let alpha = tick.values()[0];
                tick.state().alpha.push(alpha);
                if alpha >= 0.3 {
                    tick.stop();
                }
                Ok(())
            })
            .on_finish(record_finish)
            .play();

        for _ in 0..10 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha.len(), 3);
        assert!(screen.finished.is_empty());
        assert!(!group.is_active(handle));
        assert_eq!(group.stats().motions.in_use, 0);
    }

    #[test]
    fn test_started_from_callback_plays_next_update() {
        let mut group = group();
        let mut screen = Screen::default();
        let _ = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(1)
            .on_tick(|tick: &mut MotionTick<'_, Screen>| {
                let _ = tick
                    .group()
                    .get_motion()
                    .animate(40.0, 50.0, "linear")
                    .duration(1)
                    .on_tick(track_alpha)
                    .play();
                Ok(())
            })
            .play();

        group.update(&mut screen);
        assert!(screen.alpha.is_empty());
        assert_eq!(group.active_count(), 2);

        group.update(&mut screen);
        assert_eq!(screen.alpha, vec![50.0]);
    }

    #[test]
    fn test_manual_return_restart_and_release() {
        let mut group = group();
        let mut screen = Screen::default();
        let handle = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(2)
            .on_tick(track_alpha)
            .manual_return()
            .play();

        for _ in 0..3 {
            group.update(&mut screen);
        }
        assert!(group.is_detached(handle));
        assert_eq!(group.stats().motions.in_use, 1);

        assert!(group.restart(handle));
        for _ in 0..3 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha, vec![0.5, 1.0, 0.5, 1.0]);

        assert!(group.release(handle));
        assert!(!group.release(handle));
        let stats = group.stats();
        assert_eq!(stats.motions.in_use, 0);
        assert_eq!(stats.commands.in_use, 0);
    }

    #[test]
    fn test_dropped_builder_returns_everything() {
        let mut group = group();
        {
            let _builder = group
                .get_motion()
                .animate(0.0, 1.0, "linear")
                .then()
                .animate(1.0, 2.0, "linear");
        }
        let stats = group.stats();
        assert_eq!(stats.active, 0);
        assert_eq!(stats.commands.in_use, 0);
        assert_eq!(stats.commands.created_total, 2);
        assert_eq!(stats.motions.in_use, 0);
    }

    #[test]
    fn test_named_callbacks() {
        let mut group = group();
        let mut screen = Screen::default();
        group.register_update("fade", track_alpha);
        group.register_complete("done", record_finish);

        let _ = group
            .new_command()
            .set_animation(0.0, 4.0, crate::Easing::Linear)
            .set_frames(2)
            .on_update_named("fade")
            .end_command()
            .on_complete_named("done")
            .start();

        for _ in 0..3 {
            group.update(&mut screen);
        }
        assert_eq!(screen.alpha, vec![2.0, 4.0]);
        assert_eq!(screen.finished.len(), 1);
    }

    #[test]
    fn test_failing_callbacks_are_isolated() {
        let mut group = group();
        let mut screen = Screen::default();
        let erring = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(5)
            .on_tick(|_: &mut MotionTick<'_, Screen>| Err("bad leg".into()))
            .play();
        let panicking = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(5)
            .on_tick(|_: &mut MotionTick<'_, Screen>| panic!("leg exploded"))
            .on_finish(record_finish)
            .play();
        let _ = group
            .get_motion()
            .animate(0.0, 1.0, "linear")
            .duration(5)
            .on_tick(track_alpha)
            .play();

        group.update(&mut screen);
        group.update(&mut screen);

        assert!(group.is_active(erring));
        assert!(!group.is_active(panicking));
        assert!(screen.finished.is_empty());
        assert_eq!(screen.alpha.len(), 2);
        assert!(approx_eq(screen.alpha[1], 0.4, 1e-6));
    }

    #[test]
    fn test_pools_recycle_across_motions() {
        let mut group = group();
        let mut screen = Screen::default();
        for _ in 0..5 {
            let _ = group.get_motion().animate(0.0, 1.0, "linear").duration(1).play();
            group.update(&mut screen);
            group.update(&mut screen);
        }
        let stats = group.stats();
        assert_eq!(stats.motions.created_total, 1);
        assert_eq!(stats.commands.created_total, 1);
        assert_eq!(stats.motions.returned_total, 5);
    }
}
