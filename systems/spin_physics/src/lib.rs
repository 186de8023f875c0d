#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Constant-deceleration kinematics for a single spinning wheel.
//!
//! A spin starts with a randomized negative (clockwise) angular velocity and a
//! sweep proportional to the same random modifier. The deceleration is derived
//! from `v² = v₀² − 2·a·d` so the velocity reaches zero exactly when the wheel
//! has covered the sweep. Integration drift is discarded at the stop edge: the
//! angle snaps to the precomputed target, which makes the resting angle
//! independent of the frame rate used to drive [`SpinPhysics::tick`].

use std::{ops::RangeInclusive, time::Duration};

use fortune_wheel_core::{normalize_degrees, WheelEvent, FULL_TURN_DEGREES};
use log::debug;
use rand::Rng;

/// Tuning knobs shaping every spin.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinTuning {
    /// Integer range for the base angular speed in degrees per second.
    pub base_velocity: RangeInclusive<u32>,
    /// Range of the random modifier scaling both the speed and the sweep; must be positive.
    pub modifier: RangeInclusive<f64>,
    /// Full turns covered by a spin when the modifier equals one.
    pub extra_turns: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            base_velocity: 720..=1080,
            modifier: 0.8..=1.2,
            extra_turns: 6.8,
        }
    }
}

/// Random draw that fully determines one spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinImpulse {
    base_velocity: f64,
    modifier: f64,
}

impl SpinImpulse {
    /// Creates an impulse from an explicit base speed and modifier.
    #[must_use]
    pub const fn new(base_velocity: f64, modifier: f64) -> Self {
        Self {
            base_velocity,
            modifier,
        }
    }

    /// Draws the modifier and then the base speed from the tuning ranges.
    pub fn sample<R: Rng + ?Sized>(tuning: &SpinTuning, rng: &mut R) -> Self {
        debug_assert!(
            *tuning.modifier.start() > 0.0,
            "spin modifier must be positive"
        );
        let modifier = rng.gen_range(tuning.modifier.clone());
        let base_velocity = rng.gen_range(tuning.base_velocity.clone());
        Self::new(f64::from(base_velocity), modifier)
    }

    /// Signed initial angular velocity; negative spins clockwise.
    #[must_use]
    pub fn initial_velocity(&self) -> f64 {
        -self.base_velocity * self.modifier
    }

    /// Total rotation covered before the wheel rests, in degrees.
    #[must_use]
    pub fn sweep(&self, extra_turns: f64) -> f64 {
        extra_turns * self.modifier * FULL_TURN_DEGREES
    }
}

/// Rotational state of one wheel.
#[derive(Clone, Debug)]
pub struct SpinPhysics {
    tuning: SpinTuning,
    angle: f64,
    velocity: f64,
    deceleration: f64,
    target_angle: f64,
    spinning: bool,
}

impl Default for SpinPhysics {
    fn default() -> Self {
        Self::new(SpinTuning::default())
    }
}

impl SpinPhysics {
    /// Creates a motionless wheel at angle zero.
    #[must_use]
    pub fn new(tuning: SpinTuning) -> Self {
        Self {
            tuning,
            angle: 0.0,
            velocity: 0.0,
            deceleration: 0.0,
            target_angle: 0.0,
            spinning: false,
        }
    }

    /// Starts a spin using randomness drawn from `rng`.
    ///
    /// Does nothing while a spin is already in progress, leaving the random
    /// source untouched.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, out: &mut Vec<WheelEvent>) {
        if self.spinning {
            return;
        }
        let impulse = SpinImpulse::sample(&self.tuning, rng);
        self.start_with(impulse, out);
    }

    /// Starts a spin from a predetermined impulse.
    pub fn start_with(&mut self, impulse: SpinImpulse, out: &mut Vec<WheelEvent>) {
        if self.spinning {
            return;
        }

        let velocity = impulse.initial_velocity();
        let sweep = impulse.sweep(self.tuning.extra_turns);
        if !(sweep > 0.0) || velocity >= 0.0 {
            debug!("ignoring degenerate spin impulse {impulse:?}");
            return;
        }

        self.velocity = velocity;
        self.target_angle = self.angle - sweep;
        self.deceleration = velocity * velocity / (2.0 * sweep);
        self.spinning = true;
        debug!(
            "spin started: velocity {:.2} deg/s, sweep {:.2} deg, deceleration {:.2} deg/s²",
            self.velocity, sweep, self.deceleration
        );
        out.push(WheelEvent::SpinStarted {
            initial_velocity: self.velocity,
            target_angle: self.target_angle,
        });
    }

    /// Integrates the rotation over `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<WheelEvent>) {
        if !self.spinning {
            return;
        }

        let seconds = dt.as_secs_f64();
        self.angle += self.velocity * seconds;
        self.velocity += self.deceleration * seconds;

        if self.velocity >= 0.0 {
            self.velocity = 0.0;
            self.angle = self.target_angle;
            self.spinning = false;
            self.angle = normalize_degrees(self.angle);
            debug!("spin stopped at {:.4} deg", self.angle);
            out.push(WheelEvent::SpinStopped { angle: self.angle });
            return;
        }

        self.angle = normalize_degrees(self.angle);
    }

    /// Reports whether the wheel is rotating.
    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Current angle normalized into `[0, 360)`.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Signed angular velocity in degrees per second.
    #[must_use]
    pub const fn angular_velocity(&self) -> f64 {
        self.velocity
    }

    /// Magnitude of the deceleration applied during the current or last spin.
    #[must_use]
    pub const fn deceleration(&self) -> f64 {
        self.deceleration
    }

    /// Unnormalized resting angle computed when the current or last spin started.
    #[must_use]
    pub const fn target_angle(&self) -> f64 {
        self.target_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn run_to_rest(physics: &mut SpinPhysics, dt: Duration, out: &mut Vec<WheelEvent>) -> usize {
        let mut ticks = 0;
        while physics.is_spinning() {
            physics.tick(dt, out);
            ticks += 1;
            assert!(ticks < 1_000_000, "spin never settled");
        }
        ticks
    }

    #[test]
    fn fresh_wheel_is_motionless() {
        let physics = SpinPhysics::default();
        assert!(!physics.is_spinning());
        assert_eq!(physics.angle(), 0.0);
        assert_eq!(physics.angular_velocity(), 0.0);
    }

    #[test]
    fn impulse_derives_velocity_and_target() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start_with(SpinImpulse::new(900.0, 1.0), &mut out);

        assert!(physics.is_spinning());
        assert_eq!(physics.angular_velocity(), -900.0);
        assert!((physics.target_angle() + 2_448.0).abs() < 1e-9);
        let expected_deceleration = 900.0 * 900.0 / (2.0 * 2_448.0);
        assert!((physics.deceleration() - expected_deceleration).abs() < 1e-9);
        assert_eq!(
            out,
            vec![WheelEvent::SpinStarted {
                initial_velocity: -900.0,
                target_angle: physics.target_angle(),
            }]
        );
    }

    #[test]
    fn redundant_start_leaves_spin_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start(&mut rng, &mut out);
        physics.tick(FRAME, &mut out);

        let velocity = physics.angular_velocity();
        let target = physics.target_angle();
        let deceleration = physics.deceleration();

        physics.start(&mut rng, &mut out);
        physics.start_with(SpinImpulse::new(1_080.0, 1.2), &mut out);

        assert_eq!(physics.angular_velocity(), velocity);
        assert_eq!(physics.target_angle(), target);
        assert_eq!(physics.deceleration(), deceleration);
        assert_eq!(out.len(), 1, "only the first start is reported");
    }

    #[test]
    fn stop_snaps_to_normalized_target() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start_with(SpinImpulse::new(900.0, 1.0), &mut out);
        let _ = run_to_rest(&mut physics, FRAME, &mut out);

        // -2448 wraps to 72.
        assert!((physics.angle() - 72.0).abs() < 1e-9);
        assert_eq!(physics.angular_velocity(), 0.0);
        assert_eq!(
            out.last(),
            Some(&WheelEvent::SpinStopped {
                angle: physics.angle()
            })
        );
    }

    #[test]
    fn tick_without_spin_is_a_no_op() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.tick(Duration::from_secs(1), &mut out);
        assert!(out.is_empty());
        assert_eq!(physics.angle(), 0.0);
    }

    #[test]
    fn zero_dt_makes_no_progress() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start_with(SpinImpulse::new(720.0, 0.8), &mut out);
        physics.tick(Duration::ZERO, &mut out);
        assert!(physics.is_spinning());
        assert_eq!(physics.angle(), 0.0);
        assert!((physics.angular_velocity() + 576.0).abs() < 1e-9);
    }

    #[test]
    fn stop_is_reported_once() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start_with(SpinImpulse::new(1_000.0, 1.1), &mut out);
        let _ = run_to_rest(&mut physics, FRAME, &mut out);
        for _ in 0..10 {
            physics.tick(FRAME, &mut out);
        }
        let stops = out
            .iter()
            .filter(|event| matches!(event, WheelEvent::SpinStopped { .. }))
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn second_spin_starts_from_resting_angle() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start_with(SpinImpulse::new(900.0, 1.0), &mut out);
        let _ = run_to_rest(&mut physics, FRAME, &mut out);
        let rest = physics.angle();

        physics.start_with(SpinImpulse::new(900.0, 1.0), &mut out);
        assert!((physics.target_angle() - (rest - 2_448.0)).abs() < 1e-9);
    }

    #[test]
    fn degenerate_impulse_is_ignored() {
        let mut physics = SpinPhysics::default();
        let mut out = Vec::new();
        physics.start_with(SpinImpulse::new(900.0, 0.0), &mut out);
        assert!(!physics.is_spinning());
        assert!(out.is_empty());
    }
}
