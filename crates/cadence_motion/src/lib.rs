//! # CADENCE Motion
//!
//! Multi-leg numeric tweens ticked once per frame.
//!
//! A [`Motion`] is a program of legs ([`Command`]). Each leg drives up to
//! eight channels from a start value to an end value over a number of ticks,
//! every channel with its own [`Easing`]. Legs play in order, then in reverse
//! if the motion yoyos, then the whole program repeats while its repeat
//! budget lasts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cadence_motion::MotionGroup;
//!
//! let mut group: MotionGroup<Sprite> = MotionGroup::default();
//! group
//!     .get_motion()
//!     .animate(0.0, 1.0, "quad_out")
//!     .duration(30)
//!     .on_tick(|tick| {
//!         let alpha = tick.values()[0];
//!         tick.state().alpha = alpha;
//!         Ok(())
//!     })
//!     .then()
//!     .yoyo()
//!     .play();
//!
//! // Host render loop
//! group.update(&mut sprite);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod builder;
pub mod command;
pub mod easing;
pub mod group;
pub mod motion;
pub mod tick;

pub use builder::MotionBuilder;
pub use command::Command;
pub use easing::Easing;
pub use group::{GroupStats, MotionGroup};
pub use motion::{Direction, Motion, MotionFn, MotionHandle};
pub use tick::MotionTick;
