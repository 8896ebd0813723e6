//! Emotion labels assigned to incoming text.
//!
//! The set is closed. Anything the classifier reports outside of it
//! resolves to `Neutral`, which is also the fallback when classification
//! fails.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Affect category of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Sadness,
    Joy,
    Anger,
    Fear,
    Surprise,
    Disgust,
    #[default]
    Neutral,
}

impl EmotionLabel {
    /// Every label, in tone-table order.
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Sadness,
        EmotionLabel::Joy,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
        EmotionLabel::Disgust,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sadness => "sadness",
            Self::Joy => "joy",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
            Self::Disgust => "disgust",
            Self::Neutral => "neutral",
        }
    }

    /// Resolve a raw classifier label. Case and surrounding whitespace are
    /// ignored; unrecognized labels become `Neutral`.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sadness" => Self::Sadness,
            "joy" => Self::Joy,
            "anger" => Self::Anger,
            "fear" => Self::Fear,
            "surprise" => Self::Surprise,
            "disgust" => Self::Disgust,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
