//! # Memory Management
//!
//! Recycled working objects for zero-allocation frames.
//!
//! ## Design Philosophy
//!
//! Working objects are built once and recycled. During a frame:
//! - No heap allocations for runners, legs or motions
//! - Completed objects go back to the free list with their references cleared
//! - Active sets never shift while they are being dispatched

mod active_list;
mod pool;

pub use active_list::ActiveList;
pub use pool::{Pool, PoolStats, Poolable};
