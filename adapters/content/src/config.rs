use std::{io, path::Path};

use fortune_wheel_core::WheelSpec;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{read_json, write_json, ContentError};

const NO_BACKGROUND_IMAGE: &str = "None";
const DEFAULT_BACKGROUND: [u8; 3] = [60, 30, 30];

/// One question of the game and the candidates its wheel may show.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    /// Question displayed above the wheel.
    pub text: String,
    /// Number of candidates placed on the wheel.
    pub num_answers: usize,
    /// Candidate answers in wheel order.
    pub answers: Vec<String>,
}

impl QuestionConfig {
    /// Builds the wheel for this question, showing at most `num_answers` candidates.
    pub fn wheel_spec(&self) -> Result<WheelSpec, ContentError> {
        Ok(WheelSpec::from_candidates(&self.answers, self.num_answers)?)
    }
}

/// Persistent game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// One entry per draw, in draw order.
    pub questions: Vec<QuestionConfig>,
    /// Background image path, or `"None"`.
    pub bg_img: String,
    /// Background color as RGB.
    pub bg_color: [u8; 3],
    /// Universe prompt the answers were generated for.
    pub prompt: String,
    /// Background music path.
    pub music: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            bg_img: NO_BACKGROUND_IMAGE.to_owned(),
            bg_color: DEFAULT_BACKGROUND,
            prompt: String::new(),
            music: String::new(),
        }
    }
}

impl GameConfig {
    /// Reads the configuration, falling back to the default when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        match read_json(path) {
            Ok(config) => {
                info!("configuration loaded from {}", path.display());
                Ok(config)
            }
            Err(ContentError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                warn!("config file {} not found, using default", path.display());
                Ok(Self::default())
            }
            Err(error) => Err(error),
        }
    }

    /// Writes the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ContentError> {
        let path = path.as_ref();
        write_json(path, self)?;
        info!("configuration saved to {}", path.display());
        Ok(())
    }

    /// Per-draw wheels in question order.
    pub fn wheel_specs(&self) -> Result<Vec<WheelSpec>, ContentError> {
        self.questions.iter().map(QuestionConfig::wheel_spec).collect()
    }

    /// Question text of the zero-based draw, if configured.
    #[must_use]
    pub fn question_text(&self, draw: usize) -> Option<&str> {
        self.questions.get(draw).map(|question| question.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_wheel_core::WheelSpecError;

    #[test]
    fn absent_fields_take_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"questions": [{"text": "Who are you?"}]}"#).expect("parse");
        assert_eq!(config.bg_img, "None");
        assert_eq!(config.bg_color, [60, 30, 30]);
        assert_eq!(config.questions[0].num_answers, 0);
        assert!(config.questions[0].answers.is_empty());
    }

    #[test]
    fn wheel_specs_truncate_and_keep_order() {
        let config = GameConfig {
            questions: vec![
                QuestionConfig {
                    text: "Where are you from?".to_owned(),
                    num_answers: 2,
                    answers: vec!["North".to_owned(), "South".to_owned(), "East".to_owned()],
                },
                QuestionConfig {
                    text: "What is your weapon?".to_owned(),
                    num_answers: 0,
                    answers: vec!["Sword".to_owned(), "Bow".to_owned()],
                },
            ],
            ..GameConfig::default()
        };

        let specs = config.wheel_specs().expect("specs");
        assert_eq!(specs[0].labels(), ["North", "South"]);
        assert_eq!(specs[1].labels(), ["Sword"]);
        assert_eq!(config.question_text(1), Some("What is your weapon?"));
        assert_eq!(config.question_text(2), None);
    }

    #[test]
    fn question_without_answers_is_a_configuration_error() {
        let config = GameConfig {
            questions: vec![QuestionConfig {
                text: "Empty?".to_owned(),
                num_answers: 3,
                answers: Vec::new(),
            }],
            ..GameConfig::default()
        };

        assert!(matches!(
            config.wheel_specs(),
            Err(ContentError::Configuration(WheelSpecError::EmptyCandidates))
        ));
    }
}
