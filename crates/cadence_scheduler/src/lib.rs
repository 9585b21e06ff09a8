//! # CADENCE Scheduler
//!
//! Deferred and periodic callbacks counted in frames.
//!
//! ## Timing Semantics
//!
//! | `wait` | `repeat_limit` | Kind | Fires |
//! |---|---|---|---|
//! | `> 0` | `None` | [`RunnerKind::InfinitePeriodic`] | every `wait` ticks until cancelled |
//! | `0` | `None` | [`RunnerKind::InfinitePerTick`] | every tick until cancelled |
//! | `> 0` | `Some(r)` | [`RunnerKind::LimitedPeriodic`] | every `wait` ticks, `r` times |
//! | `0` | `Some(r)` | [`RunnerKind::LimitedPerTick`] | every tick, `r` times, with a countdown |
//!
//! ## Example
//!
//! ```rust,ignore
//! use cadence_scheduler::Scheduler;
//!
//! let mut scheduler: Scheduler<World> = Scheduler::default();
//! scheduler
//!     .on(|tick| { tick.env().spawn_spark(); Ok(()) }, 30, Some(4))
//!     .on_complete(|world| { world.sparks_done = true; Ok(()) });
//!
//! // Host render loop
//! scheduler.update(&mut world);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod registry;
pub mod runner;
pub mod tick;

pub use registry::{Registration, Scheduler, SchedulerStats};
pub use runner::{HookFn, Runner, RunnerHandle, RunnerKind, TaskFn};
pub use tick::Tick;
