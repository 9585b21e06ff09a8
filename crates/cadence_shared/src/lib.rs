//! # CADENCE Shared
//!
//! Constants and free math helpers used by every other CADENCE crate.
//!
//! ## Rule
//!
//! Helpers operate on plain values. Nothing here extends `f32`, `Vec` or
//! slices with new methods; call the function instead.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod math;

pub use constants::{
    DEFAULT_COMMAND_CAPACITY, DEFAULT_FRAMES, DEFAULT_MOTION_CAPACITY, DEFAULT_RUNNER_CAPACITY,
    MAX_CHANNELS,
};
pub use math::{approx_eq, clamp_unit};
