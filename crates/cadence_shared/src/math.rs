//! Scalar helpers for interpolation.

/// Clamps `t` into `[0, 1]`. NaN maps to `0`.
#[inline]
#[must_use]
pub fn clamp_unit(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Absolute-tolerance float comparison.
#[inline]
#[must_use]
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}
