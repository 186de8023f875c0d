use std::time::Duration;

use fortune_wheel_core::{normalize_degrees, WheelEvent};
use fortune_wheel_system_spin_physics::{SpinImpulse, SpinPhysics, SpinTuning};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FRAME_RATES: [u32; 3] = [30, 60, 240];

#[test]
fn resting_angle_is_independent_of_frame_rate() {
    for seed in 0..32 {
        let mut resting = Vec::new();
        for fps in FRAME_RATES {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (angle, target) = settle(&mut rng, Duration::from_secs_f64(1.0 / f64::from(fps)));
            assert_eq!(angle, normalize_degrees(target), "seed {seed} at {fps} fps");
            resting.push(angle);
        }

        for angle in &resting[1..] {
            assert!(
                (angle - resting[0]).abs() < 1e-9,
                "seed {seed} diverged across frame rates: {resting:?}"
            );
        }
    }
}

#[test]
fn every_sampled_spin_settles_within_its_kinematic_bound() {
    let tuning = SpinTuning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for _ in 0..64 {
        let impulse = SpinImpulse::sample(&tuning, &mut rng);
        let dt = Duration::from_secs_f64(1.0 / 60.0);
        let mut physics = SpinPhysics::new(tuning.clone());
        let mut out = Vec::new();
        physics.start_with(impulse, &mut out);

        // Stopping time is 2·sweep / |v₀|; allow one spare frame for rounding.
        let sweep = impulse.sweep(tuning.extra_turns);
        let stopping_time = 2.0 * sweep / impulse.initial_velocity().abs();
        let bound = (stopping_time / dt.as_secs_f64()).ceil() as usize + 1;

        let mut ticks = 0;
        while physics.is_spinning() {
            physics.tick(dt, &mut out);
            ticks += 1;
            assert!(ticks <= bound, "spin exceeded {bound} ticks");
        }
    }
}

#[test]
fn velocity_magnitude_decreases_every_tick() {
    let mut physics = SpinPhysics::default();
    let mut out = Vec::new();
    physics.start_with(SpinImpulse::new(1_080.0, 1.2), &mut out);

    let dt = Duration::from_secs_f64(1.0 / 60.0);
    let mut previous = physics.angular_velocity().abs();
    while physics.is_spinning() {
        physics.tick(dt, &mut out);
        let current = physics.angular_velocity().abs();
        assert!(current < previous, "{current} did not drop below {previous}");
        previous = current;
    }
    assert_eq!(previous, 0.0);
}

#[test]
fn started_and_stopped_events_bracket_the_spin() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut physics = SpinPhysics::default();
    let mut out = Vec::new();
    physics.start(&mut rng, &mut out);
    while physics.is_spinning() {
        physics.tick(Duration::from_millis(10), &mut out);
    }

    assert_eq!(out.len(), 2);
    let WheelEvent::SpinStarted { target_angle, .. } = out[0] else {
        panic!("expected spin start, got {:?}", out[0]);
    };
    assert_eq!(
        out[1],
        WheelEvent::SpinStopped {
            angle: normalize_degrees(target_angle)
        }
    );
}

fn settle(rng: &mut ChaCha8Rng, dt: Duration) -> (f64, f64) {
    let mut physics = SpinPhysics::default();
    let mut out = Vec::new();
    physics.start(rng, &mut out);
    let target = physics.target_angle();
    while physics.is_spinning() {
        physics.tick(dt, &mut out);
    }
    (physics.angle(), target)
}
