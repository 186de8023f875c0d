#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! File-backed content for fortune wheel sessions.
//!
//! Game configuration, the response bank and result snapshots are stored as
//! JSON. Files may start with a UTF-8 byte order mark, which is stripped before
//! parsing. Reveal animations are discovered by scanning an asset directory.

mod animations;
mod config;
mod snapshot;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use fortune_wheel_core::{ResponseBank, WheelSpecError};
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use animations::{AnimationAsset, AnimationIndex, ANIMATION_EXTENSION};
pub use config::{GameConfig, QuestionConfig};
pub use snapshot::{DrawSummary, ResultsSnapshot};

const UTF8_BOM: char = '\u{feff}';

/// Errors raised while reading or writing session content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A file could not be read or written.
    #[error("could not access {}: {source}", path.display())]
    Io {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A file did not contain the expected JSON document.
    #[error("could not parse {}: {source}", path.display())]
    Json {
        /// File that failed to parse or serialize.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// The configuration describes an unusable wheel.
    #[error(transparent)]
    Configuration(#[from] WheelSpecError),
}

impl ContentError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Loads the response bank, failing when the file is absent.
pub fn load_response_bank(path: impl AsRef<Path>) -> Result<ResponseBank, ContentError> {
    let path = path.as_ref();
    let bank: ResponseBank = read_json(path)?;
    info!(
        "loaded responses for {} draws from {}",
        bank.draw_count(),
        path.display()
    );
    Ok(bank)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::io(path, source))?;
    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);
    serde_json::from_str(body).map_err(|source| ContentError::json(path, source))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ContentError> {
    let mut body =
        serde_json::to_string_pretty(value).map_err(|source| ContentError::json(path, source))?;
    body.push('\n');
    fs::write(path, body).map_err(|source| ContentError::io(path, source))
}
