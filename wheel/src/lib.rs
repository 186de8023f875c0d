#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spinnable wheel bound to one draw's candidates.
//!
//! [`SpinWheel`] couples the spin physics with the segment selector and the
//! ordered labels of a [`WheelSpec`]. It is the only place that raises audio
//! signals, and it memoizes the outcome of each stop so every consumer
//! observes one coherent [`SelectionResult`].

use std::{num::NonZeroUsize, time::Duration};

use fortune_wheel_core::{
    AudioPort, SegmentOrdinal, SelectionResult, StateMisuse, WheelEvent, WheelSpec, WheelSpecError,
};
use fortune_wheel_system_segment_selector::SegmentSelector;
use fortune_wheel_system_spin_physics::{SpinPhysics, SpinTuning};
use log::info;
use rand::Rng;

/// Wheel holding one draw's labels together with its rotation state.
#[derive(Clone, Debug)]
pub struct SpinWheel {
    spec: WheelSpec,
    physics: SpinPhysics,
    selector: SegmentSelector,
    rested: bool,
    outcome: Option<SelectionResult>,
}

impl SpinWheel {
    /// Creates a motionless wheel with default tuning and a top indicator.
    #[must_use]
    pub fn new(spec: WheelSpec) -> Self {
        Self::with_parts(spec, SpinTuning::default(), SegmentSelector::default())
    }

    /// Creates a motionless wheel from explicit physics tuning and selector.
    #[must_use]
    pub fn with_parts(spec: WheelSpec, tuning: SpinTuning, selector: SegmentSelector) -> Self {
        info!(
            "wheel initialized with {} segments",
            spec.segment_count().get()
        );
        Self {
            spec,
            physics: SpinPhysics::new(tuning),
            selector,
            rested: false,
            outcome: None,
        }
    }

    /// Creates a wheel directly from labels, failing when none are given.
    pub fn from_labels(labels: Vec<String>) -> Result<Self, WheelSpecError> {
        WheelSpec::new(labels).map(Self::new)
    }

    /// Starts a spin unless one is already running.
    ///
    /// Returns `true` when a new spin began; the audio start signal is raised
    /// exactly once in that case.
    pub fn spin<R, A>(&mut self, rng: &mut R, audio: &mut A, out: &mut Vec<WheelEvent>) -> bool
    where
        R: Rng + ?Sized,
        A: AudioPort + ?Sized,
    {
        if self.physics.is_spinning() {
            return false;
        }

        self.physics.start(rng, out);
        if !self.physics.is_spinning() {
            return false;
        }

        self.outcome = None;
        audio.on_spin_start();
        info!("wheel spinning started");
        true
    }

    /// Advances the rotation by `dt`; raises the audio stop signal on the stop edge.
    pub fn update<A>(&mut self, dt: Duration, audio: &mut A, out: &mut Vec<WheelEvent>)
    where
        A: AudioPort + ?Sized,
    {
        let was_spinning = self.physics.is_spinning();
        self.physics.tick(dt, out);

        if was_spinning && !self.physics.is_spinning() {
            self.rested = true;
            audio.on_spin_stop();
            info!("wheel spinning stopped at {:.2} deg", self.physics.angle());
        }
    }

    /// Reports whether the wheel is rotating.
    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.physics.is_spinning()
    }

    /// Outcome of the most recent stop.
    ///
    /// The first call after a stop resolves the segment and samples the tier;
    /// later calls return the same value until the next spin starts.
    pub fn result<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<SelectionResult, StateMisuse> {
        if self.physics.is_spinning() {
            return Err(StateMisuse::SpinInProgress);
        }
        if !self.rested {
            return Err(StateMisuse::NoCompletedSpin);
        }
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }

        let index = self
            .selector
            .resolve(self.physics.angle(), self.spec.segment_count());
        let tier = self.selector.sample_tier(rng);
        let label = self.spec.labels()[index].clone();
        let outcome = SelectionResult::new(label, SegmentOrdinal::from_index(index), tier);
        info!(
            "selected segment: {}, key {}",
            outcome.segment_label(),
            outcome.outcome_key()
        );
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Ordered segment labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.spec.labels()
    }

    /// Number of segments on the wheel.
    #[must_use]
    pub fn segment_count(&self) -> NonZeroUsize {
        self.spec.segment_count()
    }

    /// Width of a single segment in degrees.
    #[must_use]
    pub fn segment_angle(&self) -> f64 {
        fortune_wheel_core::FULL_TURN_DEGREES / self.segment_count().get() as f64
    }

    /// Current wheel angle normalized into `[0, 360)`.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.physics.angle()
    }

    /// Selector used to resolve outcomes.
    #[must_use]
    pub const fn selector(&self) -> &SegmentSelector {
        &self.selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FRAME: Duration = Duration::from_micros(16_667);

    #[derive(Debug, Default)]
    struct CountingAudio {
        starts: usize,
        stops: usize,
    }

    impl AudioPort for CountingAudio {
        fn on_spin_start(&mut self) {
            self.starts += 1;
        }

        fn on_spin_stop(&mut self) {
            self.stops += 1;
        }
    }

    fn wheel(labels: &[&str]) -> SpinWheel {
        SpinWheel::from_labels(labels.iter().map(|label| (*label).to_owned()).collect())
            .expect("labels")
    }

    fn settle(wheel: &mut SpinWheel, audio: &mut CountingAudio, out: &mut Vec<WheelEvent>) {
        while wheel.is_spinning() {
            wheel.update(FRAME, audio, out);
        }
    }

    #[test]
    fn empty_labels_are_rejected() {
        assert_eq!(
            SpinWheel::from_labels(Vec::new()).err(),
            Some(WheelSpecError::EmptyCandidates)
        );
    }

    #[test]
    fn construction_preserves_label_order() {
        let wheel = wheel(&["C", "A", "B", "A"]);
        assert_eq!(wheel.labels(), ["C", "A", "B", "A"]);
        assert_eq!(wheel.segment_count().get(), 4);
        assert!((wheel.segment_angle() - 90.0).abs() < f64::EPSILON);
        assert!(!wheel.is_spinning());
    }

    #[test]
    fn result_requires_a_completed_spin() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut audio = CountingAudio::default();
        let mut out = Vec::new();
        let mut wheel = wheel(&["A", "B", "C"]);

        assert_eq!(wheel.result(&mut rng), Err(StateMisuse::NoCompletedSpin));

        assert!(wheel.spin(&mut rng, &mut audio, &mut out));
        assert_eq!(wheel.result(&mut rng), Err(StateMisuse::SpinInProgress));
    }

    #[test]
    fn audio_signals_fire_once_per_spin() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut audio = CountingAudio::default();
        let mut out = Vec::new();
        let mut wheel = wheel(&["A", "B"]);

        assert!(wheel.spin(&mut rng, &mut audio, &mut out));
        assert!(!wheel.spin(&mut rng, &mut audio, &mut out));
        settle(&mut wheel, &mut audio, &mut out);
        wheel.update(FRAME, &mut audio, &mut out);

        assert_eq!(audio.starts, 1);
        assert_eq!(audio.stops, 1);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn result_is_memoized_until_next_spin() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut audio = CountingAudio::default();
        let mut out = Vec::new();
        let mut wheel = wheel(&["A", "B", "C", "D", "E"]);

        assert!(wheel.spin(&mut rng, &mut audio, &mut out));
        settle(&mut wheel, &mut audio, &mut out);

        let first = wheel.result(&mut rng).expect("first result");
        for _ in 0..10 {
            assert_eq!(wheel.result(&mut rng).expect("repeat result"), first);
        }
        assert_eq!(
            wheel.labels()[first.segment_ordinal().index()],
            first.segment_label()
        );
    }

    #[test]
    fn new_spin_clears_the_previous_outcome() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut audio = CountingAudio::default();
        let mut out = Vec::new();
        let mut wheel = wheel(&["A", "B", "C"]);

        assert!(wheel.spin(&mut rng, &mut audio, &mut out));
        settle(&mut wheel, &mut audio, &mut out);
        let _ = wheel.result(&mut rng).expect("result");

        assert!(wheel.spin(&mut rng, &mut audio, &mut out));
        assert_eq!(wheel.result(&mut rng), Err(StateMisuse::SpinInProgress));
        settle(&mut wheel, &mut audio, &mut out);
        assert!(wheel.result(&mut rng).is_ok());
        assert_eq!(audio.starts, 2);
        assert_eq!(audio.stops, 2);
    }

    #[test]
    fn resolved_segment_matches_resting_angle() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut audio = CountingAudio::default();
        let mut out = Vec::new();
        let mut wheel = wheel(&["A", "B", "C", "D", "E", "F"]);

        assert!(wheel.spin(&mut rng, &mut audio, &mut out));
        settle(&mut wheel, &mut audio, &mut out);
        let outcome = wheel.result(&mut rng).expect("result");

        let expected = wheel.selector().resolve(wheel.angle(), wheel.segment_count());
        assert_eq!(outcome.segment_ordinal().index(), expected);
    }
}
