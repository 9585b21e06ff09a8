//! # Motions
//!
//! A leg program and the state machine that plays it.
//!
//! ## Pass Order
//!
//! ```text
//! forward:   leg 0, leg 1, ... leg n-1
//! backward:  leg n-1, ... leg 0        (yoyo only, each leg time-reversed)
//! repeat:    back to leg 0 forward     (while repeats remain)
//! finished:  completion callback, then pool or parking
//! ```

use cadence_core::{Callback, CallbackResult, Poolable};
use cadence_shared::MAX_CHANNELS;

use crate::command::{Command, Track};
use crate::tick::MotionTick;

/// Leg update or motion completion callback.
pub type MotionFn<S> = dyn FnMut(&mut MotionTick<'_, S>) -> CallbackResult;

/// Stable identity of a motion. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MotionHandle {
    id: u64,
}

impl MotionHandle {
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

/// Playback direction of the current pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Legs in order, each from start to end.
    #[default]
    Forward,
    /// Legs in reverse order, each from end to start.
    Backward,
}

/// Result of one [`Motion::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// The current leg produced new values.
    Frame,
    /// The finished leg handed over to the next one. No values this tick.
    Handover,
    /// Every pass has run.
    Finished,
}

/// A multi-leg tween.
pub struct Motion<S> {
    pub(crate) handle: MotionHandle,
    /// The leg program.
    pub(crate) commands: Vec<Command<S>>,
    /// Leg being configured by a builder.
    pub(crate) open: Option<Command<S>>,
    /// Index of the current leg.
    pub(crate) cursor: usize,
    direction: Direction,
    /// Replay the legs backward after the forward pass.
    pub(crate) yoyo: bool,
    /// Extra passes after the first.
    pub(crate) repeat: u32,
    repeats_left: u32,
    /// Ticks spent in the current leg.
    elapsed: u32,
    /// Copy of the current leg's numeric state.
    pub(crate) working: Track,
    /// Latest interpolated values.
    pub(crate) values: [f32; MAX_CHANNELS],
    pub(crate) on_complete: Option<Callback<MotionFn<S>>>,
    /// Return to the pool when finished instead of parking.
    pub(crate) auto_return: bool,
    pub(crate) playing: bool,
}

impl<S> Motion<S> {
    /// Builds an empty motion. Used as the pool factory.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            handle: MotionHandle::new(0),
            commands: Vec::new(),
            open: None,
            cursor: 0,
            direction: Direction::Forward,
            yoyo: false,
            repeat: 0,
            repeats_left: 0,
            elapsed: 0,
            working: Track::EMPTY,
            values: [0.0; MAX_CHANNELS],
            on_complete: None,
            auto_return: true,
            playing: false,
        }
    }

    /// Returns the motion's handle.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> MotionHandle {
        self.handle
    }

    /// Number of legs in the program.
    #[inline]
    #[must_use]
    pub fn leg_count(&self) -> usize {
        self.commands.len()
    }

    /// Index of the current leg.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Direction of the current pass.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Repeat passes still to run.
    #[inline]
    #[must_use]
    pub const fn repeats_left(&self) -> u32 {
        self.repeats_left
    }

    /// Returns true while the motion is in a group's active list.
    #[inline]
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Latest values of the current leg's channels.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values[..self.working.channels]
    }

    /// Rewinds to the first tick of leg 0 with the full repeat budget.
    pub(crate) fn rewind(&mut self) {
        self.direction = Direction::Forward;
        self.repeats_left = self.repeat;
        self.load(0);
    }

    /// Runs one tick.
    ///
    /// A tick either interpolates the current leg or, once the leg has run
    /// its course, moves to the next leg of the pass order. Moving on takes
    /// a whole tick, the same as finishing.
    pub(crate) fn advance(&mut self) -> Step {
        if self.elapsed >= self.working.frames {
            return if self.next_leg() { Step::Handover } else { Step::Finished };
        }
        self.elapsed += 1;

        #[allow(clippy::cast_precision_loss)]
        let progress = self.elapsed as f32 / self.working.frames as f32;
        let q = match self.direction {
            Direction::Forward => progress,
            Direction::Backward => 1.0 - progress,
        };
        self.working.sample(q, &mut self.values);
        Step::Frame
    }

    /// Moves the cursor to the next leg of the pass order. Returns false when
    /// every pass has run.
    fn next_leg(&mut self) -> bool {
        let last = self.commands.len().saturating_sub(1);
        match self.direction {
            Direction::Forward if self.cursor < last => self.cursor += 1,
            Direction::Forward if self.yoyo => self.direction = Direction::Backward,
            Direction::Backward if self.cursor > 0 => self.cursor -= 1,
            _ if self.repeats_left > 0 => {
                self.repeats_left -= 1;
                self.direction = Direction::Forward;
                self.cursor = 0;
            }
            _ => return false,
        }
        self.load(self.cursor);
        true
    }

    /// Makes leg `index` current and writes its entry values: the start on
    /// a forward pass, the end on a backward one.
    fn load(&mut self, index: usize) {
        self.cursor = index;
        self.elapsed = 0;
        if let Some(command) = self.commands.get(index) {
            self.working = command.track;
        }
        let entry = match self.direction {
            Direction::Forward => 0.0,
            Direction::Backward => 1.0,
        };
        self.working.sample(entry, &mut self.values);
    }
}

impl<S> Poolable for Motion<S> {
    type Args = MotionHandle;

    fn init(&mut self, handle: MotionHandle) {
        self.handle = handle;
        self.auto_return = true;
    }

    fn reset(&mut self) {
        self.commands.clear();
        self.open = None;
        self.cursor = 0;
        self.direction = Direction::Forward;
        self.yoyo = false;
        self.repeat = 0;
        self.repeats_left = 0;
        self.elapsed = 0;
        self.working = Track::EMPTY;
        self.values = [0.0; MAX_CHANNELS];
        self.on_complete = None;
        self.playing = false;
    }
}

impl<S> std::fmt::Debug for Motion<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Motion")
            .field("handle", &self.handle)
            .field("legs", &self.commands.len())
            .field("cursor", &self.cursor)
            .field("direction", &self.direction)
            .field("yoyo", &self.yoyo)
            .field("repeats_left", &self.repeats_left)
            .field("elapsed", &self.elapsed)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    fn program(legs: &[(f32, f32, u32)], yoyo: bool, repeat: u32) -> Motion<()> {
        let mut motion = Motion::blank();
        motion.init(MotionHandle::new(1));
        for &(start, end, frames) in legs {
            let mut leg = Command::blank();
            leg.init(60);
            leg.set_animation(start, end, Easing::Linear).unwrap();
            leg.set_frames(frames);
            motion.commands.push(leg);
        }
        motion.yoyo = yoyo;
        motion.repeat = repeat;
        motion.rewind();
        motion
    }

    fn run(motion: &mut Motion<()>) -> Vec<f32> {
        let mut trace = Vec::new();
        for _ in 0..1_000 {
            match motion.advance() {
                Step::Frame => trace.push(motion.values()[0]),
                Step::Handover => {}
                Step::Finished => return trace,
            }
        }
        panic!("motion never finished");
    }

    #[test]
    fn test_legs_run_in_order() {
        let mut motion = program(&[(0.0, 2.0, 2), (10.0, 13.0, 3)], false, 0);
        assert_eq!(run(&mut motion), vec![1.0, 2.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_moving_to_next_leg_takes_a_tick() {
        let mut motion = program(&[(0.0, 2.0, 2), (10.0, 14.0, 2)], false, 0);
        let steps: Vec<Step> = (0..6).map(|_| motion.advance()).collect();
        assert_eq!(
            steps,
            vec![
                Step::Frame,
                Step::Frame,
                Step::Handover,
                Step::Frame,
                Step::Frame,
                Step::Finished
            ]
        );
    }

    #[test]
    fn test_rewind_writes_first_start() {
        let mut motion = program(&[(5.0, 9.0, 4), (9.0, 1.0, 2)], true, 1);
        assert_eq!(motion.values(), &[5.0]);

        run(&mut motion);
        assert_eq!(motion.values(), &[5.0]);
        motion.rewind();
        assert_eq!(motion.values(), &[5.0]);
        assert_eq!(motion.repeats_left(), 1);
    }

    #[test]
    fn test_handover_writes_entry_values() {
        let mut motion = program(&[(0.0, 2.0, 1), (10.0, 14.0, 1)], true, 0);
        assert_eq!(motion.advance(), Step::Frame);
        assert_eq!(motion.advance(), Step::Handover);
        assert_eq!(motion.values(), &[10.0]);
        assert_eq!(motion.advance(), Step::Frame);
        assert_eq!(motion.advance(), Step::Handover);
        assert_eq!(motion.direction(), Direction::Backward);
        assert_eq!(motion.values(), &[14.0]);
    }

    #[test]
    fn test_yoyo_replays_in_reverse() {
        let mut motion = program(&[(0.0, 2.0, 2), (10.0, 14.0, 2)], true, 0);
        let trace = run(&mut motion);
        assert_eq!(trace, vec![1.0, 2.0, 12.0, 14.0, 12.0, 10.0, 1.0, 0.0]);
        assert_eq!(motion.direction(), Direction::Backward);
    }

    #[test]
    fn test_repeat_restarts_forward() {
        let mut motion = program(&[(0.0, 4.0, 2)], true, 2);
        let trace = run(&mut motion);
        assert_eq!(trace.len(), 2 * 2 * 3);
        assert_eq!(&trace[..4], &[2.0, 4.0, 2.0, 0.0]);
        assert_eq!(motion.repeats_left(), 0);
    }

    #[test]
    fn test_finished_motion_stays_finished() {
        let mut motion = program(&[(0.0, 1.0, 1)], false, 0);
        assert_eq!(motion.advance(), Step::Frame);
        assert_eq!(motion.advance(), Step::Finished);
        assert_eq!(motion.advance(), Step::Finished);
    }
}
