#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fortune Wheel engine.
//!
//! This crate defines the vocabulary that connects the pure systems, the
//! authoritative wheel and the adapters. The spin physics system reports
//! [`WheelEvent`] values while a wheel rotates, the draw sequencer reports
//! [`SessionEvent`] values as a session progresses, and adapters plug in the
//! collaborators the core never implements itself: an [`AudioPort`], an
//! [`AnimationSource`] and the read-only [`ResponseBank`].

use std::{collections::BTreeMap, fmt, num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of degrees that compose a full wheel turn.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Fixed indicator position measured in degrees; 90 points at the top of the wheel.
pub const INDICATOR_ANGLE_DEGREES: f64 = 90.0;

/// Smallest tier that may be sampled for a completed spin.
pub const TIER_MIN: u8 = 1;

/// Largest tier that may be sampled for a completed spin.
pub const TIER_MAX: u8 = 5;

/// Reveal duration used when an animation exists for the outcome.
pub const ANIMATED_REVEAL: Duration = Duration::from_secs(3);

/// Reveal duration used when the outcome has no animation.
pub const PLAIN_REVEAL: Duration = Duration::from_millis(1_500);

/// Wraps an angle expressed in degrees into the half-open range `[0, 360)`.
///
/// Tiny negative inputs can round up to exactly 360 after `rem_euclid`, so the
/// upper bound is folded back to zero to keep the range half-open.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN_DEGREES);
    if wrapped >= FULL_TURN_DEGREES {
        0.0
    } else {
        wrapped
    }
}

/// Quality bucket sampled independently of where the wheel stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    /// Creates a tier when the value lies within `TIER_MIN..=TIER_MAX`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= TIER_MIN && value <= TIER_MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Creates a tier, clamping the value into `TIER_MIN..=TIER_MAX`.
    #[must_use]
    pub const fn saturating(value: u8) -> Self {
        if value < TIER_MIN {
            Self(TIER_MIN)
        } else if value > TIER_MAX {
            Self(TIER_MAX)
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric tier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Key used by the response bank for this tier, e.g. `"3/10"`.
    #[must_use]
    pub fn response_key(&self) -> String {
        format!("{}/10", self.0)
    }
}

impl TryFrom<u8> for Tier {
    type Error = InvalidTier;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidTier(value))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when a numeric value falls outside the tier range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("tier {0} is outside the range 1..=5")]
pub struct InvalidTier(pub u8);

/// One-based position of a segment on its wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentOrdinal(u32);

impl SegmentOrdinal {
    /// Converts a zero-based segment index into its ordinal.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let ordinal = u32::try_from(index).unwrap_or(u32::MAX - 1);
        Self(ordinal.saturating_add(1))
    }

    /// Retrieves the one-based ordinal.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based index of the segment.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0.saturating_sub(1) as usize
    }
}

impl fmt::Display for SegmentOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the animation that belongs to an outcome; displays as `"<ordinal>.<tier>"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutcomeKey {
    ordinal: SegmentOrdinal,
    tier: Tier,
}

impl OutcomeKey {
    /// Creates a key from its parts.
    #[must_use]
    pub const fn new(ordinal: SegmentOrdinal, tier: Tier) -> Self {
        Self { ordinal, tier }
    }

    /// Segment ordinal portion of the key.
    #[must_use]
    pub const fn ordinal(&self) -> SegmentOrdinal {
        self.ordinal
    }

    /// Tier portion of the key.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ordinal, self.tier)
    }
}

/// Immutable outcome of one completed spin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionResult {
    label: String,
    ordinal: SegmentOrdinal,
    tier: Tier,
}

impl SelectionResult {
    /// Creates a new selection result.
    #[must_use]
    pub fn new(label: String, ordinal: SegmentOrdinal, tier: Tier) -> Self {
        Self {
            label,
            ordinal,
            tier,
        }
    }

    /// Label of the segment under the indicator.
    #[must_use]
    pub fn segment_label(&self) -> &str {
        &self.label
    }

    /// One-based position of the selected segment.
    #[must_use]
    pub const fn segment_ordinal(&self) -> SegmentOrdinal {
        self.ordinal
    }

    /// Independently sampled tier.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Key used to look up the reveal animation for this outcome.
    #[must_use]
    pub const fn outcome_key(&self) -> OutcomeKey {
        OutcomeKey::new(self.ordinal, self.tier)
    }
}

/// One row of the accumulating session results.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Outcome of the spin that completed the draw.
    pub selection: SelectionResult,
    /// Flavor text picked from the response bank for the outcome.
    pub flavor_text: String,
}

/// Immutable per-draw wheel configuration: the labels actually shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct WheelSpec {
    labels: Vec<String>,
}

impl WheelSpec {
    /// Creates a wheel specification from the exact labels to display.
    pub fn new(labels: Vec<String>) -> Result<Self, WheelSpecError> {
        if labels.is_empty() {
            return Err(WheelSpecError::EmptyCandidates);
        }
        Ok(Self { labels })
    }

    /// Creates a wheel from the first `num_answers` candidates.
    ///
    /// A `num_answers` of zero still shows one segment, and a value larger
    /// than the candidate list shows every candidate.
    pub fn from_candidates(
        candidates: &[String],
        num_answers: usize,
    ) -> Result<Self, WheelSpecError> {
        let shown = num_answers.max(1).min(candidates.len());
        Self::new(candidates[..shown].to_vec())
    }

    /// Ordered labels, one per segment.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of segments on the wheel.
    #[must_use]
    pub fn segment_count(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.labels.len()).unwrap_or(NonZeroUsize::MIN)
    }
}

impl TryFrom<Vec<String>> for WheelSpec {
    type Error = WheelSpecError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<WheelSpec> for Vec<String> {
    fn from(spec: WheelSpec) -> Self {
        spec.labels
    }
}

/// Phase of the draw sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// A wheel is shown for the current draw; it may be at rest awaiting a trigger or rotating.
    Spinning,
    /// The outcome of the current draw is being revealed while a countdown runs.
    RevealWait,
    /// Every draw has completed; terminal until an external restart.
    Results,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spinning => "spinning",
            Self::RevealWait => "reveal-wait",
            Self::Results => "results",
        };
        f.write_str(name)
    }
}

/// Events reported by the spin physics while a wheel rotates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelEvent {
    /// A spin began.
    SpinStarted {
        /// Signed initial angular velocity in degrees per second.
        initial_velocity: f64,
        /// Unnormalized angle at which the wheel will come to rest.
        target_angle: f64,
    },
    /// The wheel came to rest.
    SpinStopped {
        /// Normalized resting angle in degrees.
        angle: f64,
    },
}

/// Events broadcast by the draw sequencer as a session progresses.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A new draw was entered and its wheel created.
    DrawStarted {
        /// Zero-based index of the draw.
        draw: usize,
    },
    /// The wheel of the current draw started rotating.
    SpinStarted {
        /// Zero-based index of the draw.
        draw: usize,
    },
    /// The wheel of the current draw came to rest.
    SpinStopped {
        /// Zero-based index of the draw.
        draw: usize,
        /// Normalized resting angle in degrees.
        angle: f64,
    },
    /// The outcome of the current draw was recorded.
    DrawResolved {
        /// Zero-based index of the draw.
        draw: usize,
        /// Record appended to the session results.
        record: DrawRecord,
    },
    /// The reveal countdown started.
    RevealStarted {
        /// Zero-based index of the draw.
        draw: usize,
        /// Length of the countdown.
        duration: Duration,
        /// Whether an animation accompanies the reveal.
        animated: bool,
    },
    /// Every draw has completed.
    ResultsReady {
        /// Number of records collected during the session.
        draws: usize,
    },
}

/// Fire-and-forget audio signals raised by a spinning wheel.
///
/// Implementations swallow their own failures; nothing propagates back into
/// the wheel.
pub trait AudioPort {
    /// Invoked once when a spin begins.
    fn on_spin_start(&mut self);

    /// Invoked once when the wheel comes to rest.
    fn on_spin_stop(&mut self);
}

/// Audio port that ignores every signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioPort for SilentAudio {
    fn on_spin_start(&mut self) {}

    fn on_spin_stop(&mut self) {}
}

/// Supplies optional reveal animations keyed by outcome.
pub trait AnimationSource {
    /// Opaque handle forwarded to rendering.
    type Handle;

    /// Returns the animation for the outcome, if one exists.
    fn try_load(&mut self, key: OutcomeKey) -> Option<Self::Handle>;
}

/// Animation source without any animations; every reveal is plain.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAnimations;

impl AnimationSource for NoAnimations {
    type Handle = ();

    fn try_load(&mut self, _key: OutcomeKey) -> Option<Self::Handle> {
        None
    }
}

/// Read-only mapping from draw number and tier to candidate flavor texts.
///
/// The serialized form is `{"<draw_number>": {"<tier>/10": ["text", ...]}}`
/// where draw numbers are one-based.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseBank {
    entries: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ResponseBank {
    /// Creates an empty response bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds flavor texts for the one-based draw number and tier, replacing earlier ones.
    #[must_use]
    pub fn with_responses(mut self, draw_number: u32, tier: Tier, texts: Vec<String>) -> Self {
        let _ = self
            .entries
            .entry(draw_number.to_string())
            .or_default()
            .insert(tier.response_key(), texts);
        self
    }

    /// Candidate flavor texts for the one-based draw number and tier.
    pub fn lookup(&self, draw_number: u32, tier: Tier) -> Result<&[String], LookupError> {
        let tiers = self
            .entries
            .get(&draw_number.to_string())
            .ok_or(LookupError::MissingDraw { draw_number })?;
        let texts = tiers
            .get(&tier.response_key())
            .ok_or(LookupError::MissingTier { draw_number, tier })?;
        if texts.is_empty() {
            return Err(LookupError::EmptyEntry { draw_number, tier });
        }
        Ok(texts)
    }

    /// Number of draws that carry at least one tier entry.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.entries.len()
    }
}

/// Configuration errors raised while preparing wheels for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WheelSpecError {
    /// A draw supplied no candidates, which would produce a zero-segment wheel.
    #[error("a draw must provide at least one candidate")]
    EmptyCandidates,
    /// The session contains no draws.
    #[error("a session must contain at least one draw")]
    NoDraws,
}

/// Missing content in the response bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The response bank has no section for the draw.
    #[error("response bank has no entry for draw {draw_number}")]
    MissingDraw {
        /// One-based draw number.
        draw_number: u32,
    },
    /// The draw section has no entry for the tier.
    #[error("response bank has no entry for draw {draw_number}, tier {tier}/10")]
    MissingTier {
        /// One-based draw number.
        draw_number: u32,
        /// Tier that was sampled.
        tier: Tier,
    },
    /// The entry exists but lists no texts.
    #[error("response bank entry for draw {draw_number}, tier {tier}/10 is empty")]
    EmptyEntry {
        /// One-based draw number.
        draw_number: u32,
        /// Tier that was sampled.
        tier: Tier,
    },
}

/// Calls made in a state that does not permit them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StateMisuse {
    /// A result was requested before the wheel completed any spin.
    #[error("no spin has completed yet")]
    NoCompletedSpin,
    /// A result was requested while the wheel is still rotating.
    #[error("the wheel is still spinning")]
    SpinInProgress,
    /// The reveal was advanced outside the reveal phase.
    #[error("cannot advance the reveal while in the {phase} phase")]
    NotRevealing {
        /// Phase the sequencer was in.
        phase: Phase,
    },
    /// Final results were requested before the session finished.
    #[error("results are unavailable while in the {phase} phase")]
    ResultsNotReady {
        /// Phase the sequencer was in.
        phase: Phase,
    },
}
