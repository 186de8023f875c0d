#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns a resting wheel angle into a discrete choice.

use std::num::NonZeroUsize;

use fortune_wheel_core::{
    normalize_degrees, Tier, FULL_TURN_DEGREES, INDICATOR_ANGLE_DEGREES, TIER_MAX, TIER_MIN,
};
use rand::Rng;

/// Maps resting angles to segments relative to a fixed indicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentSelector {
    indicator_angle: f64,
}

impl Default for SegmentSelector {
    fn default() -> Self {
        Self::new(INDICATOR_ANGLE_DEGREES)
    }
}

impl SegmentSelector {
    /// Creates a selector whose indicator sits at `indicator_angle` degrees.
    #[must_use]
    pub fn new(indicator_angle: f64) -> Self {
        Self {
            indicator_angle: normalize_degrees(indicator_angle),
        }
    }

    /// Indicator position in degrees.
    #[must_use]
    pub const fn indicator_angle(&self) -> f64 {
        self.indicator_angle
    }

    /// Zero-based index of the segment under the indicator.
    #[must_use]
    pub fn resolve(&self, angle: f64, segment_count: NonZeroUsize) -> usize {
        resolve_index(angle, segment_count, self.indicator_angle)
    }

    /// Samples the response tier. Independent of [`SegmentSelector::resolve`].
    pub fn sample_tier<R: Rng + ?Sized>(&self, rng: &mut R) -> Tier {
        sample_tier(rng)
    }
}

/// Zero-based index of the segment under an indicator at `indicator_angle`.
///
/// The wheel's rotation is inverted before the indicator offset is applied, so
/// the segment drawn under the fixed pointer is the one selected.
#[must_use]
pub fn resolve_index(angle: f64, segment_count: NonZeroUsize, indicator_angle: f64) -> usize {
    let count = segment_count.get();
    let adjusted = normalize_degrees(FULL_TURN_DEGREES - normalize_degrees(angle));
    let relative = normalize_degrees(adjusted + indicator_angle);
    let segment_width = FULL_TURN_DEGREES / count as f64;
    // NaN casts to zero, and the modulo folds the rare rounding onto `count`.
    (relative / segment_width).floor() as usize % count
}

/// Uniform tier in `TIER_MIN..=TIER_MAX`.
pub fn sample_tier<R: Rng + ?Sized>(rng: &mut R) -> Tier {
    let value = rng.gen_range(TIER_MIN..=TIER_MAX);
    Tier::saturating(value)
}
