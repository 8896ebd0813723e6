//! Tone policy table.
//!
//! Maps each emotion label to the instruction that steers the style of the
//! generated reply. The lookup is total: unknown labels get the neutral line.

use crate::emotion::EmotionLabel;

const SADNESS: &str = "Respond with empathy, gentleness, and support.";
const JOY: &str = "Share in their happiness; respond with a celebratory and positive tone.";
const ANGER: &str = "Respond with a calm, patient, de-escalating tone.";
const FEAR: &str = "Respond with a reassuring and calming tone.";
const SURPRISE: &str = "Respond with curiosity and engagement.";
const DISGUST: &str = "Respond with a neutral, understanding tone.";
const NEUTRAL: &str = "Respond in a standard, helpful, friendly tone.";

/// One row of the tone policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneEntry {
    pub label: EmotionLabel,
    pub instruction: &'static str,
}

/// The full table, one entry per label.
pub const TONE_TABLE: [ToneEntry; 7] = [
    ToneEntry { label: EmotionLabel::Sadness, instruction: SADNESS },
    ToneEntry { label: EmotionLabel::Joy, instruction: JOY },
    ToneEntry { label: EmotionLabel::Anger, instruction: ANGER },
    ToneEntry { label: EmotionLabel::Fear, instruction: FEAR },
    ToneEntry { label: EmotionLabel::Surprise, instruction: SURPRISE },
    ToneEntry { label: EmotionLabel::Disgust, instruction: DISGUST },
    ToneEntry { label: EmotionLabel::Neutral, instruction: NEUTRAL },
];

/// Tone instruction for a label.
pub fn tone_for(label: EmotionLabel) -> &'static str {
    match label {
        EmotionLabel::Sadness => SADNESS,
        EmotionLabel::Joy => JOY,
        EmotionLabel::Anger => ANGER,
        EmotionLabel::Fear => FEAR,
        EmotionLabel::Surprise => SURPRISE,
        EmotionLabel::Disgust => DISGUST,
        EmotionLabel::Neutral => NEUTRAL,
    }
}

/// Tone instruction for a raw label string, e.g. straight from a classifier.
pub fn tone_for_raw(raw: &str) -> &'static str {
    tone_for(EmotionLabel::from_label(raw))
}
