//! The closed 7-value emotion label set
//!
//! Every user turn and every diary draft is classified into exactly one
//! of these labels. The set is fixed by the upstream classifier; songs
//! in the catalog are tagged with the same labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emotion label assigned by the emotion classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Surprise,
    Anger,
    Sadness,
    Happiness,
    Disgust,
    Fear,
}

impl Emotion {
    /// All labels in classifier index order
    pub const ALL: [Emotion; 7] = [
        Emotion::Neutral,
        Emotion::Surprise,
        Emotion::Anger,
        Emotion::Sadness,
        Emotion::Happiness,
        Emotion::Disgust,
        Emotion::Fear,
    ];

    /// Map a classifier class index to its label
    ///
    /// The classifier's output head is ordered neutral..fear; a label
    /// outside 0..=6 is a classifier contract violation.
    pub fn from_index(index: usize) -> Option<Emotion> {
        Emotion::ALL.get(index).copied()
    }

    /// Lowercase label string, as serialized on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Surprise => "surprise",
            Emotion::Anger => "anger",
            Emotion::Sadness => "sadness",
            Emotion::Happiness => "happiness",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Emotion::Neutral),
            "surprise" => Ok(Emotion::Surprise),
            "anger" => Ok(Emotion::Anger),
            "sadness" => Ok(Emotion::Sadness),
            "happiness" => Ok(Emotion::Happiness),
            "disgust" => Ok(Emotion::Disgust),
            "fear" => Ok(Emotion::Fear),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown emotion label: {}",
                other
            ))),
        }
    }
}
