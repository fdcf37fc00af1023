//! Sentiment Classification
//! Mission: Tag every message body with a positive/neutral/negative label

use serde::{Deserialize, Serialize};

/// Sentiment label attached to a stored message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sentiment {
    #[serde(rename = "positive")]
    Positive,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "negative")]
    Negative,
}

impl Sentiment {
    /// Map a polarity score in [-1.0, 1.0] to a label.
    ///
    /// Thresholds: > 0.2 positive, < -0.2 negative, else neutral.
    pub fn from_score(score: f64) -> Self {
        if score > 0.2 {
            Sentiment::Positive
        } else if score < -0.2 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

/// Pluggable polarity scorer.
///
/// Implementations must be deterministic: the same body text always yields
/// the same score, so a stored label can be recomputed on update without
/// drifting.
pub trait SentimentClassifier: Send + Sync {
    /// Polarity score in [-1.0, 1.0].
    fn score(&self, text: &str) -> f64;

    fn classify(&self, text: &str) -> Sentiment {
        Sentiment::from_score(self.score(text))
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "amazing",
    "awesome",
    "best",
    "brilliant",
    "congratulations",
    "delighted",
    "excellent",
    "fantastic",
    "glad",
    "good",
    "great",
    "happy",
    "love",
    "nice",
    "outstanding",
    "perfect",
    "pleased",
    "superb",
    "thanks",
    "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry",
    "annoying",
    "awful",
    "bad",
    "broken",
    "disappointed",
    "disappointing",
    "failed",
    "failure",
    "hate",
    "horrible",
    "poor",
    "regret",
    "sad",
    "terrible",
    "unacceptable",
    "upset",
    "useless",
    "worst",
    "wrong",
];

/// Default classifier: mean polarity over lexicon hits.
///
/// Words carry +1.0 or -1.0 polarity; the score is the average across the
/// words that matched, and 0.0 when nothing matched. Matching is
/// case-insensitive and ignores punctuation.
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn score(&self, text: &str) -> f64 {
        let mut total = 0.0f64;
        let mut hits = 0usize;

        for raw in text.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }

            if POSITIVE_WORDS.binary_search(&word.as_str()).is_ok() {
                total += 1.0;
                hits += 1;
            } else if NEGATIVE_WORDS.binary_search(&word.as_str()).is_ok() {
                total -= 1.0;
                hits += 1;
            }
        }

        if hits == 0 {
            0.0
        } else {
            total / hits as f64
        }
    }
}
