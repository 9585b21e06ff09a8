//! # CADENCE Core
//!
//! The allocation-free building blocks the scheduler and the motion engine
//! stand on.
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in the hot path** - working objects come from a [`Pool`]
//! 2. **Mutation-safe iteration** - active sets are [`ActiveList`]s, iterated by snapshot
//! 3. **No dynamic property lookup** - named callbacks resolve through a [`DispatchTable`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use cadence_core::{Pool, Poolable};
//!
//! let mut pool: Pool<Particle> = Pool::new("particles", 64, Particle::blank);
//! let particle = pool.get(spawn_args);
//! // ... one frame later
//! pool.release(particle);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod dispatch;
pub mod error;
pub mod guard;
pub mod memory;

pub use dispatch::{Callback, DispatchTable};
pub use error::{CadenceError, CadenceResult, CallbackError, CallbackResult};
pub use guard::{guarded, Outcome};
pub use memory::{ActiveList, Pool, PoolStats, Poolable};
