//! Sentiment classification types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::judgment::Judgment;

/// Sentiment polarity reported by the model.
///
/// Deserialization is lenient: English and Chinese polarity words map onto
/// the fixed labels, anything else is kept verbatim in [`SentimentLabel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// The reply carried no label at all.
    #[default]
    Unknown,
    Other(String),
}

impl SentimentLabel {
    /// Labels the model is asked to choose from.
    pub const CHOICES: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Unknown => "unknown",
            SentimentLabel::Other(s) => s,
        }
    }
}

impl From<String> for SentimentLabel {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" | "正面" => SentimentLabel::Positive,
            "negative" | "負面" | "负面" => SentimentLabel::Negative,
            "neutral" | "中性" => SentimentLabel::Neutral,
            "" | "unknown" => SentimentLabel::Unknown,
            _ => SentimentLabel::Other(s),
        }
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sentiment judgment: label plus confidence.
///
/// Missing keys in the model's reply take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default)]
    pub sentiment: SentimentLabel,
    /// Nominally in [0, 1]; not clamped.
    #[serde(default)]
    pub confidence: f64,
}

impl Sentiment {
    pub fn new(sentiment: SentimentLabel, confidence: f64) -> Self {
        Self {
            sentiment,
            confidence,
        }
    }
}

/// Flat, serializable view of a sentiment judgment for export and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Judgment<Sentiment>> for SentimentRecord {
    fn from(judgment: &Judgment<Sentiment>) -> Self {
        let value = judgment.value();
        Self {
            sentiment: value.sentiment.clone(),
            confidence: value.confidence,
            error: judgment.failure().map(|f| f.message().to_string()),
        }
    }
}
