use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use fortune_wheel_core::{AnimationSource, OutcomeKey};
use log::{debug, info, warn};

use crate::ContentError;

/// File extension of reveal animations.
pub const ANIMATION_EXTENSION: &str = "gif";

/// Reveal animation located on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationAsset {
    /// Outcome the animation belongs to.
    pub key: OutcomeKey,
    /// Location of the animation file.
    pub path: PathBuf,
}

/// In-memory index of the `.gif` files found in one directory, keyed by file stem.
///
/// Outcomes are looked up by their formatted key, so `3.2.gif` serves the
/// outcome with ordinal 3 and tier 2.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationIndex {
    assets: BTreeMap<String, PathBuf>,
}

impl AnimationIndex {
    /// Creates an index without any animations.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scans `dir` once; a missing directory yields an empty index.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
        let dir = dir.as_ref();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                warn!("animation directory {} not found", dir.display());
                return Ok(Self::empty());
            }
            Err(source) => return Err(ContentError::io(dir, source)),
        };

        let mut assets = BTreeMap::new();
        for entry in entries {
            let path = entry.map_err(|source| ContentError::io(dir, source))?.path();
            match animation_stem(&path) {
                Some(stem) => {
                    let _ = assets.insert(stem.to_owned(), path);
                }
                None => debug!("skipping {}", path.display()),
            }
        }

        info!("indexed {} animations in {}", assets.len(), dir.display());
        Ok(Self { assets })
    }

    /// Number of indexed animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Reports whether the index holds no animations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Animation registered for `key`, if any.
    #[must_use]
    pub fn get(&self, key: OutcomeKey) -> Option<AnimationAsset> {
        self.assets.get(&key.to_string()).map(|path| AnimationAsset {
            key,
            path: path.clone(),
        })
    }
}

impl AnimationSource for AnimationIndex {
    type Handle = AnimationAsset;

    fn try_load(&mut self, key: OutcomeKey) -> Option<Self::Handle> {
        let asset = self.get(key);
        if asset.is_none() {
            warn!("animation not found for outcome {key}");
        }
        asset
    }
}

fn animation_stem(path: &Path) -> Option<&str> {
    if path.extension()?.to_str()? != ANIMATION_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()
}
