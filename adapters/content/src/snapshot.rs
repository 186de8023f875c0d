use std::path::Path;

use fortune_wheel_core::{DrawRecord, Tier};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{read_json, write_json, ContentError, GameConfig};

/// One finished draw as presented on the results screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSummary {
    /// One-based draw number.
    pub draw: usize,
    /// Question asked for the draw, when configured.
    pub question: Option<String>,
    /// Label the wheel landed on.
    pub label: String,
    /// One-based position of the label on its wheel.
    pub ordinal: u32,
    /// Sampled tier.
    pub tier: Tier,
    /// Flavor text shown with the outcome.
    pub flavor_text: String,
}

/// Structured summary of a completed session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    /// Every draw in order.
    pub draws: Vec<DrawSummary>,
}

impl ResultsSnapshot {
    /// Pairs the session records with the configured question texts.
    #[must_use]
    pub fn from_records(records: &[DrawRecord], config: &GameConfig) -> Self {
        let draws = records
            .iter()
            .enumerate()
            .map(|(draw, record)| DrawSummary {
                draw: draw + 1,
                question: config.question_text(draw).map(str::to_owned),
                label: record.selection.segment_label().to_owned(),
                ordinal: record.selection.segment_ordinal().get(),
                tier: record.selection.tier(),
                flavor_text: record.flavor_text.clone(),
            })
            .collect();
        Self { draws }
    }

    /// Reads a previously saved snapshot.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        read_json(path.as_ref())
    }

    /// Writes the snapshot as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ContentError> {
        let path = path.as_ref();
        write_json(path, self)?;
        info!("results saved to {}", path.display());
        Ok(())
    }
}
