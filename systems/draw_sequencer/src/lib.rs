#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game state machine that strings wheel spins into a multi-draw session.
//!
//! The sequencer owns one [`SpinWheel`] per draw and moves through
//! [`Phase::Spinning`], [`Phase::RevealWait`] and finally [`Phase::Results`].
//! Each call to [`DrawSequencer::update`] advances the wheel first, resolves
//! the outcome on the frame the wheel comes to rest, and only then evaluates
//! timers, so a stop is recorded exactly once regardless of frame pacing.

use std::time::Duration;

use fortune_wheel_core::{
    AnimationSource, AudioPort, DrawRecord, LookupError, Phase, ResponseBank, SessionEvent,
    StateMisuse, WheelEvent, WheelSpec, WheelSpecError, ANIMATED_REVEAL, INDICATOR_ANGLE_DEGREES,
    PLAIN_REVEAL,
};
use fortune_wheel_system_segment_selector::SegmentSelector;
use fortune_wheel_system_spin_physics::SpinTuning;
use fortune_wheel_wheel::SpinWheel;
use log::{debug, error, info};
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

/// How the first draw of a session begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FirstDraw {
    /// The first wheel starts spinning as soon as the session starts.
    #[default]
    AutoSpin,
    /// The first wheel waits for a trigger like every later draw.
    AwaitTrigger,
}

/// Timing and wheel parameters applied to every draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SequencerConfig {
    /// Whether the first draw spins without a trigger.
    pub first_draw: FirstDraw,
    /// Reveal countdown used when an animation exists for the outcome.
    pub animated_reveal: Duration,
    /// Reveal countdown used when the outcome has no animation.
    pub plain_reveal: Duration,
    /// Physics tuning handed to every wheel.
    pub spin_tuning: SpinTuning,
    /// Indicator position in degrees shared by every wheel.
    pub indicator_angle: f64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            first_draw: FirstDraw::default(),
            animated_reveal: ANIMATED_REVEAL,
            plain_reveal: PLAIN_REVEAL,
            spin_tuning: SpinTuning::default(),
            indicator_angle: INDICATOR_ANGLE_DEGREES,
        }
    }
}

/// Validated, read-only content of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContent {
    draws: Vec<WheelSpec>,
    responses: ResponseBank,
}

impl SessionContent {
    /// Bundles the per-draw wheels with the response bank; at least one draw is required.
    pub fn new(draws: Vec<WheelSpec>, responses: ResponseBank) -> Result<Self, WheelSpecError> {
        if draws.is_empty() {
            return Err(WheelSpecError::NoDraws);
        }
        Ok(Self { draws, responses })
    }

    /// Wheels in draw order.
    #[must_use]
    pub fn draws(&self) -> &[WheelSpec] {
        &self.draws
    }

    /// Flavor texts consulted after each stop.
    #[must_use]
    pub const fn responses(&self) -> &ResponseBank {
        &self.responses
    }
}

/// Failures surfaced by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// The session content is unusable.
    #[error(transparent)]
    Configuration(#[from] WheelSpecError),
    /// The response bank lacks flavor text for an outcome.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// The caller invoked an operation the current phase does not allow.
    #[error(transparent)]
    StateMisuse(#[from] StateMisuse),
}

/// Multi-draw session state machine.
pub struct DrawSequencer<R, A, S: AnimationSource> {
    content: SessionContent,
    rng: R,
    audio: A,
    animations: S,
    config: SequencerConfig,
    phase: Phase,
    current_draw: usize,
    wheel: Option<SpinWheel>,
    reveal_timer: Duration,
    reveal_animation: Option<S::Handle>,
    records: Vec<DrawRecord>,
    wheel_events: Vec<WheelEvent>,
    failure: Option<SequencerError>,
}

impl<R, A, S> DrawSequencer<R, A, S>
where
    R: Rng,
    A: AudioPort,
    S: AnimationSource,
{
    /// Starts a session on its first draw.
    ///
    /// With [`FirstDraw::AutoSpin`] the first wheel is already spinning when
    /// this returns. Session events start with the first `update` or trigger.
    pub fn new(
        content: SessionContent,
        rng: R,
        audio: A,
        animations: S,
        config: SequencerConfig,
    ) -> Self {
        info!("draw sequencer initialized with {} draws", content.draws().len());
        let mut sequencer = Self {
            content,
            rng,
            audio,
            animations,
            config,
            phase: Phase::Spinning,
            current_draw: 0,
            wheel: None,
            reveal_timer: Duration::ZERO,
            reveal_animation: None,
            records: Vec::new(),
            wheel_events: Vec::new(),
            failure: None,
        };
        let mut startup = Vec::new();
        sequencer.enter_draw(sequencer.auto_spin_first(), &mut startup);
        sequencer
    }

    /// Requests a spin of the current wheel.
    ///
    /// Returns `true` when a spin began. Triggers outside the spinning phase,
    /// triggers while the wheel already rotates and triggers after a failed
    /// draw are ignored.
    pub fn trigger_spin(&mut self, out: &mut Vec<SessionEvent>) -> bool {
        if let Some(error) = self.failure {
            debug!("spin trigger ignored after failure: {error}");
            return false;
        }
        if self.phase != Phase::Spinning {
            debug!("spin trigger ignored in the {} phase", self.phase);
            return false;
        }
        self.spin_current(out)
    }

    /// Advances the session by one frame of `dt`.
    ///
    /// A draw whose outcome cannot be resolved halts the session: the error is
    /// returned from this call and every later one until [`Self::restart`].
    pub fn update(
        &mut self,
        dt: Duration,
        out: &mut Vec<SessionEvent>,
    ) -> Result<(), SequencerError> {
        if let Some(error) = self.failure {
            return Err(error);
        }

        match self.phase {
            Phase::Spinning => {
                let resolved = self.update_spinning(dt, out);
                if let Err(error) = resolved {
                    error!("draw {} halted: {error}", self.current_draw + 1);
                    self.failure = Some(error);
                }
                resolved
            }
            Phase::RevealWait => {
                self.reveal_timer = self.reveal_timer.saturating_sub(dt);
                if self.reveal_timer.is_zero() {
                    self.finish_reveal(out);
                }
                Ok(())
            }
            Phase::Results => Ok(()),
        }
    }

    /// Ends the running reveal immediately.
    pub fn advance(&mut self, out: &mut Vec<SessionEvent>) -> Result<(), SequencerError> {
        if self.phase != Phase::RevealWait {
            return Err(StateMisuse::NotRevealing { phase: self.phase }.into());
        }
        info!("reveal of draw {} skipped", self.current_draw + 1);
        self.finish_reveal(out);
        Ok(())
    }

    /// Discards every record and starts over from the first draw.
    pub fn restart(&mut self, out: &mut Vec<SessionEvent>) {
        info!("session restarted");
        self.records.clear();
        self.failure = None;
        self.current_draw = 0;
        self.reveal_timer = Duration::ZERO;
        self.reveal_animation = None;
        self.enter_draw(self.auto_spin_first(), out);
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Zero-based index of the current draw; equals [`Self::total_draws`] once results are ready.
    #[must_use]
    pub const fn current_draw(&self) -> usize {
        self.current_draw
    }

    /// Number of draws in the session.
    #[must_use]
    pub fn total_draws(&self) -> usize {
        self.content.draws().len()
    }

    /// Error that halted the session, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<SequencerError> {
        self.failure
    }

    /// Records collected so far, in draw order.
    #[must_use]
    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    /// Every record of a finished session.
    pub fn final_records(&self) -> Result<&[DrawRecord], StateMisuse> {
        if self.phase != Phase::Results {
            return Err(StateMisuse::ResultsNotReady { phase: self.phase });
        }
        Ok(&self.records)
    }

    /// Wheel of the current draw; absent once results are ready.
    #[must_use]
    pub fn wheel(&self) -> Option<&SpinWheel> {
        self.wheel.as_ref()
    }

    /// Time left in the running reveal.
    #[must_use]
    pub fn reveal_remaining(&self) -> Option<Duration> {
        (self.phase == Phase::RevealWait).then_some(self.reveal_timer)
    }

    /// Animation accompanying the running reveal, if one was found.
    #[must_use]
    pub fn reveal_animation(&self) -> Option<&S::Handle> {
        self.reveal_animation.as_ref()
    }

    fn auto_spin_first(&self) -> bool {
        self.config.first_draw == FirstDraw::AutoSpin
    }

    fn enter_draw(&mut self, auto_spin: bool, out: &mut Vec<SessionEvent>) {
        let spec = self.content.draws()[self.current_draw].clone();
        self.wheel = Some(SpinWheel::with_parts(
            spec,
            self.config.spin_tuning.clone(),
            SegmentSelector::new(self.config.indicator_angle),
        ));
        self.phase = Phase::Spinning;
        info!(
            "new wheel generated for draw {}/{}",
            self.current_draw + 1,
            self.total_draws()
        );
        out.push(SessionEvent::DrawStarted {
            draw: self.current_draw,
        });

        if auto_spin {
            let _ = self.spin_current(out);
        }
    }

    fn spin_current(&mut self, out: &mut Vec<SessionEvent>) -> bool {
        let Some(wheel) = self.wheel.as_mut() else {
            return false;
        };

        self.wheel_events.clear();
        let started = wheel.spin(&mut self.rng, &mut self.audio, &mut self.wheel_events);
        if started {
            out.push(SessionEvent::SpinStarted {
                draw: self.current_draw,
            });
        }
        started
    }

    fn update_spinning(
        &mut self,
        dt: Duration,
        out: &mut Vec<SessionEvent>,
    ) -> Result<(), SequencerError> {
        let Some(wheel) = self.wheel.as_mut() else {
            return Ok(());
        };

        self.wheel_events.clear();
        wheel.update(dt, &mut self.audio, &mut self.wheel_events);

        let mut stopped = false;
        for event in self.wheel_events.drain(..) {
            if let WheelEvent::SpinStopped { angle } = event {
                stopped = true;
                out.push(SessionEvent::SpinStopped {
                    draw: self.current_draw,
                    angle,
                });
            }
        }

        if stopped {
            self.resolve_draw(out)?;
        }
        Ok(())
    }

    fn resolve_draw(&mut self, out: &mut Vec<SessionEvent>) -> Result<(), SequencerError> {
        let draw = self.current_draw;
        let Some(wheel) = self.wheel.as_mut() else {
            return Ok(());
        };

        let selection = wheel.result(&mut self.rng)?;
        let draw_number = u32::try_from(draw + 1).unwrap_or(u32::MAX);
        let tier = selection.tier();
        let candidates = self.content.responses().lookup(draw_number, tier)?;
        let flavor_text = candidates
            .choose(&mut self.rng)
            .cloned()
            .ok_or(LookupError::EmptyEntry { draw_number, tier })?;

        let key = selection.outcome_key();
        let record = DrawRecord {
            selection,
            flavor_text,
        };
        info!(
            "added result for draw {draw_number}: {}, response: {}",
            record.selection.segment_label(),
            record.flavor_text
        );
        self.records.push(record.clone());
        out.push(SessionEvent::DrawResolved { draw, record });

        self.reveal_animation = self.animations.try_load(key);
        let animated = self.reveal_animation.is_some();
        let duration = if animated {
            self.config.animated_reveal
        } else {
            debug!("no animation for outcome {key}");
            self.config.plain_reveal
        };

        self.reveal_timer = duration;
        self.phase = Phase::RevealWait;
        info!("reveal timer set to {:.2} seconds", duration.as_secs_f64());
        out.push(SessionEvent::RevealStarted {
            draw,
            duration,
            animated,
        });
        Ok(())
    }

    fn finish_reveal(&mut self, out: &mut Vec<SessionEvent>) {
        self.reveal_timer = Duration::ZERO;
        self.reveal_animation = None;
        self.current_draw += 1;
        info!(
            "current draw incremented to {}/{}",
            self.current_draw,
            self.total_draws()
        );

        if self.current_draw >= self.total_draws() {
            self.current_draw = self.total_draws();
            self.wheel = None;
            self.phase = Phase::Results;
            info!("all draws complete, showing results");
            out.push(SessionEvent::ResultsReady {
                draws: self.records.len(),
            });
            return;
        }

        self.enter_draw(false, out);
    }
}
