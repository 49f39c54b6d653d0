//! Sentiment data model shared by the pipeline and its callers.

use serde::{Deserialize, Serialize};

/// Score assigned when nothing more specific is known.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Polarity of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// Map a free-form label string onto a polarity.
    ///
    /// Matching is case-insensitive substring search so that "pozitif",
    /// "POSITIVE" and "LABEL: positive" all resolve; anything unrecognised
    /// (including "nötr") is neutral.
    #[must_use]
    pub fn from_label_text(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("pozitif") || lower.contains("positive") {
            Self::Positive
        } else if lower.contains("negatif") || lower.contains("negative") {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Label as persisted next to chat messages and rendered by the chat UI.
    #[must_use]
    pub fn wire_label(self) -> &'static str {
        match self {
            Self::Positive => "pozitif",
            Self::Negative => "negatif",
            Self::Neutral => "nötr",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final sentiment annotation for one message. Always populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentResult {
    #[must_use]
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self { label, score }
    }

    /// Neutral with score 0.5, the state before any analysis has run.
    #[must_use]
    pub fn neutral() -> Self {
        Self::new(SentimentLabel::Neutral, NEUTRAL_SCORE)
    }

    /// Force the score into `[0, 1]`; non-finite scores become neutral.
    #[must_use]
    pub fn clamped(self) -> Self {
        let score = if self.score.is_finite() {
            self.score.clamp(0.0, 1.0)
        } else {
            NEUTRAL_SCORE
        };
        Self { score, ..self }
    }
}

impl Default for SentimentResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A chat message together with the annotation the persistence layer stores.
///
/// Serializes with the field names the chat UI reads (`sentiment`,
/// `sentimentScore`) and the legacy label spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedMessage {
    pub text: String,
    #[serde(with = "wire_label")]
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
}

impl AnnotatedMessage {
    #[must_use]
    pub fn new(text: impl Into<String>, result: SentimentResult) -> Self {
        Self {
            text: text.into(),
            sentiment: result.label,
            sentiment_score: result.score,
        }
    }

    #[must_use]
    pub fn result(&self) -> SentimentResult {
        SentimentResult::new(self.sentiment, self.sentiment_score)
    }
}

mod wire_label {
    use {
        super::SentimentLabel,
        serde::{Deserialize, Deserializer, Serializer},
    };

    pub fn serialize<S: Serializer>(label: &SentimentLabel, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(label.wire_label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SentimentLabel, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(SentimentLabel::from_label_text(&raw))
    }
}
