//! # CADENCE
//!
//! Tick-driven scheduling and interpolation for real-time visual effects.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Cadence<S>                               │
//! │                                                                  │
//! │   ┌────────────────────────┐       ┌──────────────────────────┐  │
//! │   │  cadence_scheduler     │       │  cadence_motion          │  │
//! │   │                        │       │                          │  │
//! │   │  • 4 runner kinds      │──────>│  • Easing table          │  │
//! │   │  • Snapshot dispatch   │ start │  • Leg programs          │  │
//! │   │  • Completion hooks    │ tweens│  • Yoyo / repeat passes  │  │
//! │   └───────────┬────────────┘       └─────────────┬────────────┘  │
//! │               │                                  │               │
//! │               └──────────────┬───────────────────┘               │
//! │                              v                                   │
//! │               ┌─────────────────────────────┐                    │
//! │               │  cadence_core               │                    │
//! │               │  • Pools   • Active lists   │                    │
//! │               │  • Dispatch tables • Guard  │                    │
//! │               └─────────────────────────────┘                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `context`: the `Cadence<S>` engine the host loop ticks

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod context;

// Re-export the engines
pub use cadence_core as core;
pub use cadence_motion as motion;
pub use cadence_scheduler as scheduler;
pub use cadence_shared as shared;

// Re-export commonly used types
pub use cadence_core::{CadenceError, CadenceResult, CallbackResult};
pub use cadence_motion::{Easing, MotionBuilder, MotionHandle, MotionTick};
pub use cadence_scheduler::{Registration, RunnerHandle, Tick};
pub use config::{CadenceConfig, MotionConfig, PoolConfig};
pub use context::{Cadence, CadenceStats, Stage};

/// Scheduler task context of a [`Cadence<S>`].
pub type StageTick<'a, S> = Tick<'a, Stage<S>>;
