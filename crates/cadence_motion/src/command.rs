//! # Commands
//!
//! One leg of a motion: up to [`MAX_CHANNELS`] values travelling from a start
//! to an end over a fixed number of ticks.

use cadence_core::{CadenceError, CadenceResult, Callback, Poolable};
use cadence_shared::MAX_CHANNELS;

use crate::easing::Easing;
use crate::motion::MotionFn;

/// The numeric part of a leg. Copied into a motion's working registers when
/// the leg becomes current.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Track {
    pub start: [f32; MAX_CHANNELS],
    pub end: [f32; MAX_CHANNELS],
    pub delta: [f32; MAX_CHANNELS],
    pub easing: [Easing; MAX_CHANNELS],
    pub channels: usize,
    pub frames: u32,
}

impl Track {
    pub const EMPTY: Self = Self {
        start: [0.0; MAX_CHANNELS],
        end: [0.0; MAX_CHANNELS],
        delta: [0.0; MAX_CHANNELS],
        easing: [Easing::Linear; MAX_CHANNELS],
        channels: 0,
        frames: 1,
    };

    /// Writes every channel at effective progress `q` into `out`.
    ///
    /// An eased value of exactly 0 or 1 writes the stored start or end, so
    /// leg boundaries land on the configured values bit for bit.
    pub fn sample(&self, q: f32, out: &mut [f32; MAX_CHANNELS]) {
        for (i, slot) in out.iter_mut().enumerate().take(self.channels) {
            let eased = self.easing[i].apply(q);
            *slot = if eased <= 0.0 && q <= 0.0 {
                self.start[i]
            } else if eased >= 1.0 && q >= 1.0 {
                self.end[i]
            } else {
                self.start[i] + self.delta[i] * eased
            };
        }
    }
}

/// A motion leg.
pub struct Command<S> {
    pub(crate) track: Track,
    /// Called after every tick of this leg with the fresh values.
    pub(crate) on_update: Option<Callback<MotionFn<S>>>,
}

impl<S> Command<S> {
    /// Builds an empty leg. Used as the pool factory.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            track: Track::EMPTY,
            on_update: None,
        }
    }

    /// Adds a channel.
    ///
    /// # Errors
    ///
    /// [`CadenceError::TooManyChannels`] when the leg already drives
    /// [`MAX_CHANNELS`] channels. The leg is left unchanged.
    pub fn set_animation(&mut self, start: f32, end: f32, easing: Easing) -> CadenceResult<()> {
        let track = &mut self.track;
        if track.channels >= MAX_CHANNELS {
            return Err(CadenceError::TooManyChannels {
                limit: MAX_CHANNELS,
            });
        }
        let i = track.channels;
        track.start[i] = start;
        track.end[i] = end;
        track.delta[i] = end - start;
        track.easing[i] = easing;
        track.channels += 1;
        Ok(())
    }

    /// Sets the leg duration in ticks. Zero is raised to one.
    pub fn set_frames(&mut self, frames: u32) {
        if frames == 0 {
            tracing::warn!("leg duration of zero ticks raised to one");
        }
        self.track.frames = frames.max(1);
    }

    /// Sets the per-tick callback.
    pub fn on_update(&mut self, callback: Callback<MotionFn<S>>) {
        self.on_update = Some(callback);
    }

    /// Channels in use.
    #[inline]
    #[must_use]
    pub fn channels(&self) -> usize {
        self.track.channels
    }

    /// Duration in ticks.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.track.frames
    }

    /// Start values of the channels in use.
    #[must_use]
    pub fn start_values(&self) -> &[f32] {
        &self.track.start[..self.track.channels]
    }

    /// End values of the channels in use.
    #[must_use]
    pub fn end_values(&self) -> &[f32] {
        &self.track.end[..self.track.channels]
    }
}

impl<S> Poolable for Command<S> {
    /// Default duration for the fresh leg.
    type Args = u32;

    fn init(&mut self, default_frames: u32) {
        self.track.frames = default_frames.max(1);
    }

    fn reset(&mut self) {
        self.track = Track::EMPTY;
        self.on_update = None;
    }
}

impl<S> std::fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("channels", &self.track.channels)
            .field("frames", &self.track.frames)
            .field("start", &self.start_values())
            .field("end", &self.end_values())
            .field("on_update", &self.on_update)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg() -> Command<()> {
        let mut leg = Command::blank();
        leg.init(60);
        leg
    }

    #[test]
    fn test_ninth_channel_rejected() {
        let mut leg = leg();
        for i in 0..MAX_CHANNELS {
            assert!(leg.set_animation(0.0, i as f32, Easing::Linear).is_ok());
        }
        assert_eq!(
            leg.set_animation(0.0, 99.0, Easing::Linear),
            Err(CadenceError::TooManyChannels { limit: 8 })
        );
        assert_eq!(leg.channels(), MAX_CHANNELS);
        assert_eq!(leg.end_values()[7], 7.0);
    }

    #[test]
    fn test_zero_frames_clamped() {
        let mut leg = leg();
        leg.set_frames(0);
        assert_eq!(leg.frames(), 1);
        leg.set_frames(12);
        assert_eq!(leg.frames(), 12);
    }

    #[test]
    fn test_sample_hits_endpoints_exactly() {
        let mut leg = leg();
        leg.set_animation(0.1, 0.7, Easing::QuadOut).unwrap();
        let mut out = [0.0; MAX_CHANNELS];

        leg.track.sample(1.0, &mut out);
        assert_eq!(out[0], 0.7);
        leg.track.sample(0.0, &mut out);
        assert_eq!(out[0], 0.1);
        leg.track.sample(0.5, &mut out);
        assert!(out[0] > 0.1 && out[0] < 0.7);
    }

    #[test]
    fn test_reset_clears_leg() {
        let mut leg = leg();
        leg.set_animation(1.0, 2.0, Easing::Linear).unwrap();
        leg.on_update(Callback::named("fade"));
        leg.reset();
        assert_eq!(leg.channels(), 0);
        assert!(leg.on_update.is_none());

        leg.init(15);
        assert_eq!(leg.frames(), 15);
    }
}
