//! # Engine Constants
//!
//! Baked-in limits for the frame engine.
//!
//! **CRITICAL:** `MAX_CHANNELS` sizes fixed buffers inside every leg and every
//! motion. Raising it grows every pooled object.

// =============================================================================
// INTERPOLATION
// =============================================================================

/// Maximum parallel channels one leg can interpolate.
pub const MAX_CHANNELS: usize = 8;

/// Default leg duration in ticks (one second at 60 Hz).
pub const DEFAULT_FRAMES: u32 = 60;

// =============================================================================
// POOL CAPACITIES
// =============================================================================

/// Idle runners kept per runner kind.
pub const DEFAULT_RUNNER_CAPACITY: usize = 256;

/// Idle legs kept by a motion group.
pub const DEFAULT_COMMAND_CAPACITY: usize = 512;

/// Idle motions kept by a motion group.
pub const DEFAULT_MOTION_CAPACITY: usize = 128;
