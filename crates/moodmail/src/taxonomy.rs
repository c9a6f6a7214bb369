//! Emotion taxonomy: maps fine-grained classifier labels onto nine coarse
//! categories and ranks those categories by priority.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Priority assigned to any category name the priority table does not know.
pub const DEFAULT_PRIORITY: i64 = 1;

/// Label used when the classifier returns no labels at all.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Coarse emotion category used for all storage and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Trust,
    Fear,
    Surprise,
    Sadness,
    Disgust,
    Anger,
    Anticipation,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 9] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Sadness,
        Emotion::Disgust,
        Emotion::Anger,
        Emotion::Anticipation,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Trust => "trust",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Sadness => "sadness",
            Emotion::Disgust => "disgust",
            Emotion::Anger => "anger",
            Emotion::Anticipation => "anticipation",
            Emotion::Neutral => "neutral",
        }
    }

    /// Parses a stored category name. Returns `None` for anything outside
    /// the nine categories.
    pub fn parse(name: &str) -> Option<Emotion> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Ranking used when picking the predominant emotion of a day.
    pub fn priority(&self) -> i64 {
        match self {
            Emotion::Joy => 10,
            Emotion::Trust => 8,
            Emotion::Surprise => 7,
            Emotion::Anticipation => 6,
            Emotion::Anger => 5,
            Emotion::Fear => 4,
            Emotion::Disgust => 3,
            Emotion::Sadness => 2,
            Emotion::Neutral => 1,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained classifier labels and the category each one folds into.
const LABEL_MAPPING: &[(&str, Emotion)] = &[
    ("joy", Emotion::Joy),
    ("amusement", Emotion::Joy),
    ("excitement", Emotion::Joy),
    ("gratitude", Emotion::Joy),
    ("love", Emotion::Joy),
    ("optimism", Emotion::Joy),
    ("pride", Emotion::Joy),
    ("relief", Emotion::Joy),
    ("approval", Emotion::Trust),
    ("admiration", Emotion::Trust),
    ("caring", Emotion::Trust),
    ("fear", Emotion::Fear),
    ("nervousness", Emotion::Fear),
    ("embarrassment", Emotion::Fear),
    ("surprise", Emotion::Surprise),
    ("realization", Emotion::Surprise),
    ("confusion", Emotion::Surprise),
    ("curiosity", Emotion::Surprise),
    ("sadness", Emotion::Sadness),
    ("disappointment", Emotion::Sadness),
    ("grief", Emotion::Sadness),
    ("remorse", Emotion::Sadness),
    ("disgust", Emotion::Disgust),
    ("anger", Emotion::Anger),
    ("annoyance", Emotion::Anger),
    ("disapproval", Emotion::Anger),
    ("desire", Emotion::Anticipation),
    ("neutral", Emotion::Neutral),
];

/// Maps a raw classifier label to its coarse category. Lookup is
/// case-insensitive; unknown labels become [`Emotion::Neutral`].
pub fn map_label(raw: &str) -> Emotion {
    let needle = raw.trim().to_lowercase();
    LABEL_MAPPING
        .iter()
        .find(|(label, _)| *label == needle)
        .map(|(_, emotion)| *emotion)
        .unwrap_or(Emotion::Neutral)
}

/// Priority for a stored category name, falling back to
/// [`DEFAULT_PRIORITY`] for names outside the taxonomy.
pub fn priority_of(category: &str) -> i64 {
    Emotion::parse(category)
        .map(|e| e.priority())
        .unwrap_or(DEFAULT_PRIORITY)
}
