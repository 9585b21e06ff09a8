//! # Easing Table
//!
//! Pure progress curves. Every curve maps `[0, 1]` onto a value that starts
//! at 0 and ends at 1; `back` and `elastic` overshoot in between.
//!
//! Only the `in` shape of each family is written out. The `out` shape is its
//! mirror and the `in_out` shape joins the two halves.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use cadence_core::{CadenceError, CadenceResult};
use cadence_shared::clamp_unit;

/// Easing curve applied to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// `t^2`.
    QuadIn,
    /// Mirror of [`Easing::QuadIn`].
    QuadOut,
    /// Quadratic on both ends.
    QuadInOut,
    /// `t^3`.
    CubicIn,
    /// Mirror of [`Easing::CubicIn`].
    CubicOut,
    /// Cubic on both ends.
    CubicInOut,
    /// `t^4`.
    QuartIn,
    /// Mirror of [`Easing::QuartIn`].
    QuartOut,
    /// Quartic on both ends.
    QuartInOut,
    /// `t^5`.
    QuintIn,
    /// Mirror of [`Easing::QuintIn`].
    QuintOut,
    /// Quintic on both ends.
    QuintInOut,
    /// Quarter cosine.
    SineIn,
    /// Mirror of [`Easing::SineIn`].
    SineOut,
    /// Half cosine.
    SineInOut,
    /// `2^(10(t-1))`.
    ExpoIn,
    /// Mirror of [`Easing::ExpoIn`]. Sharp snap to target.
    ExpoOut,
    /// Exponential on both ends.
    ExpoInOut,
    /// Quarter circle.
    CircIn,
    /// Mirror of [`Easing::CircIn`].
    CircOut,
    /// Circular on both ends.
    CircInOut,
    /// Pulls back below 0 before leaving.
    BackIn,
    /// Overshoots 1 before settling.
    BackOut,
    /// Back on both ends.
    BackInOut,
    /// Growing oscillation.
    ElasticIn,
    /// Decaying oscillation around the target.
    ElasticOut,
    /// Elastic on both ends.
    ElasticInOut,
    /// Bounces in reverse.
    BounceIn,
    /// Bounces against the target.
    BounceOut,
    /// Bounce on both ends.
    BounceInOut,
}

impl Easing {
    /// Every curve, in table order.
    pub const ALL: [Self; 31] = [
        Self::Linear,
        Self::QuadIn,
        Self::QuadOut,
        Self::QuadInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuartIn,
        Self::QuartOut,
        Self::QuartInOut,
        Self::QuintIn,
        Self::QuintOut,
        Self::QuintInOut,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::ExpoIn,
        Self::ExpoOut,
        Self::ExpoInOut,
        Self::CircIn,
        Self::CircOut,
        Self::CircInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];

    /// Applies the curve to a progress value.
    ///
    /// `t` is clamped to `[0, 1]`. The endpoints are exact: `apply(0.0)` is
    /// `0.0` and `apply(1.0)` is `1.0` for every curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = clamp_unit(t);
        if t <= 0.0 {
            0.0
        } else if t >= 1.0 {
            1.0
        } else {
            (self.function())(t)
        }
    }

    /// Returns the raw curve. Endpoints are not pinned.
    #[must_use]
    pub fn function(self) -> fn(f32) -> f32 {
        match self {
            Self::Linear => linear,
            Self::QuadIn => quad_in,
            Self::QuadOut => quad_out,
            Self::QuadInOut => quad_in_out,
            Self::CubicIn => cubic_in,
            Self::CubicOut => cubic_out,
            Self::CubicInOut => cubic_in_out,
            Self::QuartIn => quart_in,
            Self::QuartOut => quart_out,
            Self::QuartInOut => quart_in_out,
            Self::QuintIn => quint_in,
            Self::QuintOut => quint_out,
            Self::QuintInOut => quint_in_out,
            Self::SineIn => sine_in,
            Self::SineOut => sine_out,
            Self::SineInOut => sine_in_out,
            Self::ExpoIn => expo_in,
            Self::ExpoOut => expo_out,
            Self::ExpoInOut => expo_in_out,
            Self::CircIn => circ_in,
            Self::CircOut => circ_out,
            Self::CircInOut => circ_in_out,
            Self::BackIn => back_in,
            Self::BackOut => back_out,
            Self::BackInOut => back_in_out,
            Self::ElasticIn => elastic_in,
            Self::ElasticOut => elastic_out,
            Self::ElasticInOut => elastic_in_out,
            Self::BounceIn => bounce_in,
            Self::BounceOut => bounce_out,
            Self::BounceInOut => bounce_in_out,
        }
    }

    /// Canonical name, e.g. `"cubic_in_out"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        CANONICAL[self as usize]
    }

    /// Looks a curve up by name.
    ///
    /// Case, `_`, `-` and spaces are ignored, an `ease` prefix is optional and
    /// the shape may come before or after the family, so `"QuadOut"`,
    /// `"quad-out"` and `"easeOutQuad"` all name [`Easing::QuadOut`].
    ///
    /// # Errors
    ///
    /// [`CadenceError::UnknownEasing`] when nothing matches.
    pub fn from_name(name: &str) -> CadenceResult<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let key = key.strip_prefix("ease").unwrap_or(key.as_str());

        Self::ALL
            .iter()
            .copied()
            .find(|easing| easing.answers_to(key))
            .ok_or_else(|| CadenceError::UnknownEasing(name.to_owned()))
    }

    /// Looks a curve up by name, falling back to [`Easing::Linear`] with a warning.
    #[must_use]
    pub fn from_name_or_linear(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|error| {
            tracing::warn!(%error, "falling back to linear easing");
            Self::Linear
        })
    }

    fn parts(self) -> (&'static str, &'static str) {
        let family = match self {
            Self::Linear => return ("linear", ""),
            Self::QuadIn | Self::QuadOut | Self::QuadInOut => "quad",
            Self::CubicIn | Self::CubicOut | Self::CubicInOut => "cubic",
            Self::QuartIn | Self::QuartOut | Self::QuartInOut => "quart",
            Self::QuintIn | Self::QuintOut | Self::QuintInOut => "quint",
            Self::SineIn | Self::SineOut | Self::SineInOut => "sine",
            Self::ExpoIn | Self::ExpoOut | Self::ExpoInOut => "expo",
            Self::CircIn | Self::CircOut | Self::CircInOut => "circ",
            Self::BackIn | Self::BackOut | Self::BackInOut => "back",
            Self::ElasticIn | Self::ElasticOut | Self::ElasticInOut => "elastic",
            Self::BounceIn | Self::BounceOut | Self::BounceInOut => "bounce",
        };
        let shape = match (self as usize - 1) % 3 {
            0 => "in",
            1 => "out",
            _ => "inout",
        };
        (family, shape)
    }

    fn answers_to(self, key: &str) -> bool {
        let (family, shape) = self.parts();
        key.strip_prefix(family).is_some_and(|rest| rest == shape)
            || key.strip_prefix(shape).is_some_and(|rest| rest == family)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

const CANONICAL: [&str; 31] = [
    "linear",
    "quad_in",
    "quad_out",
    "quad_in_out",
    "cubic_in",
    "cubic_out",
    "cubic_in_out",
    "quart_in",
    "quart_out",
    "quart_in_out",
    "quint_in",
    "quint_out",
    "quint_in_out",
    "sine_in",
    "sine_out",
    "sine_in_out",
    "expo_in",
    "expo_out",
    "expo_in_out",
    "circ_in",
    "circ_out",
    "circ_in_out",
    "back_in",
    "back_out",
    "back_in_out",
    "elastic_in",
    "elastic_out",
    "elastic_in_out",
    "bounce_in",
    "bounce_out",
    "bounce_in_out",
];

// =============================================================================
// CURVES
// =============================================================================

const BACK_OVERSHOOT: f32 = 1.701_58;
const ELASTIC_PERIOD: f32 = (2.0 * PI) / 3.0;

/// Derives the `out` and `in_out` shapes from an `in` curve.
macro_rules! mirrored {
    ($in:ident, $out:ident, $in_out:ident) => {
        fn $out(t: f32) -> f32 {
            1.0 - $in(1.0 - t)
        }

        fn $in_out(t: f32) -> f32 {
            if t < 0.5 {
                $in(2.0 * t) / 2.0
            } else {
                1.0 - $in(2.0 - 2.0 * t) / 2.0
            }
        }
    };
}

fn linear(t: f32) -> f32 {
    t
}

fn quad_in(t: f32) -> f32 {
    t * t
}

fn cubic_in(t: f32) -> f32 {
    t * t * t
}

fn quart_in(t: f32) -> f32 {
    t.powi(4)
}

fn quint_in(t: f32) -> f32 {
    t.powi(5)
}

fn sine_in(t: f32) -> f32 {
    1.0 - (t * PI / 2.0).cos()
}

fn expo_in(t: f32) -> f32 {
    2.0_f32.powf(10.0 * t - 10.0)
}

fn circ_in(t: f32) -> f32 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn back_in(t: f32) -> f32 {
    (BACK_OVERSHOOT + 1.0) * t * t * t - BACK_OVERSHOOT * t * t
}

fn elastic_in(t: f32) -> f32 {
    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_PERIOD).sin()
}

fn bounce_in(t: f32) -> f32 {
    1.0 - bounce_curve(1.0 - t)
}

/// Four parabolic hops settling on 1.
fn bounce_curve(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984_375
    }
}

mirrored!(quad_in, quad_out, quad_in_out);
mirrored!(cubic_in, cubic_out, cubic_in_out);
mirrored!(quart_in, quart_out, quart_in_out);
mirrored!(quint_in, quint_out, quint_in_out);
mirrored!(sine_in, sine_out, sine_in_out);
mirrored!(expo_in, expo_out, expo_in_out);
mirrored!(circ_in, circ_out, circ_in_out);
mirrored!(back_in, back_out, back_in_out);
mirrored!(elastic_in, elastic_out, elastic_in_out);
mirrored!(bounce_in, bounce_out, bounce_in_out);
