//! Tests for tone.rs

use attune_shared::tone::{tone_for, tone_for_raw, TONE_TABLE};
use attune_shared::EmotionLabel;
use std::collections::HashSet;

#[test]
fn test_table_has_one_entry_per_label() {
    let labels: HashSet<EmotionLabel> = TONE_TABLE.iter().map(|e| e.label).collect();
    assert_eq!(labels.len(), TONE_TABLE.len());
    for label in EmotionLabel::ALL {
        assert!(labels.contains(&label), "missing tone entry for {}", label);
    }
}

#[test]
fn test_table_agrees_with_lookup() {
    for entry in TONE_TABLE {
        assert_eq!(tone_for(entry.label), entry.instruction);
    }
}

#[test]
fn test_instructions_verbatim() {
    assert_eq!(
        tone_for(EmotionLabel::Sadness),
        "Respond with empathy, gentleness, and support."
    );
    assert_eq!(
        tone_for(EmotionLabel::Joy),
        "Share in their happiness; respond with a celebratory and positive tone."
    );
    assert_eq!(
        tone_for(EmotionLabel::Anger),
        "Respond with a calm, patient, de-escalating tone."
    );
    assert_eq!(
        tone_for(EmotionLabel::Fear),
        "Respond with a reassuring and calming tone."
    );
    assert_eq!(
        tone_for(EmotionLabel::Surprise),
        "Respond with curiosity and engagement."
    );
    assert_eq!(
        tone_for(EmotionLabel::Disgust),
        "Respond with a neutral, understanding tone."
    );
    assert_eq!(
        tone_for(EmotionLabel::Neutral),
        "Respond in a standard, helpful, friendly tone."
    );
}

#[test]
fn test_unrecognized_label_gets_neutral_tone() {
    let neutral = tone_for(EmotionLabel::Neutral);
    assert_eq!(tone_for_raw("love"), neutral);
    assert_eq!(tone_for_raw("optimism"), neutral);
    assert_eq!(tone_for_raw(""), neutral);
}

#[test]
fn test_raw_lookup_matches_known_labels() {
    assert_eq!(tone_for_raw("joy"), tone_for(EmotionLabel::Joy));
    assert_eq!(tone_for_raw("Fear"), tone_for(EmotionLabel::Fear));
}
