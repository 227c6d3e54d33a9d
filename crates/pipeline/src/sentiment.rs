//! Free-text sentiment -> [`Mood`].
//!
//! The analyzer sits behind a trait so a model-backed implementation can be
//! swapped in. The default is a word-list scorer: each known word counts
//! +1 or -1, a preceding negation ("not", "never", "no", "n't") flips the
//! sign of the next sentiment word, and the sign of the total picks the mood.

use crate::mood::Mood;
use std::collections::HashSet;
use tracing::debug;

/// Maps free text to a mood label. Never fails: anything it cannot judge
/// is neutral.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Mood;
}

const POSITIVE_WORDS: &[&str] = &[
    "happy", "glad", "great", "good", "awesome", "amazing", "excited", "energetic", "energized",
    "fantastic", "wonderful", "love", "loving", "joy", "joyful", "cheerful", "thrilled", "pumped",
    "motivated", "fun", "excellent", "positive", "delighted", "content", "optimistic", "fresh",
    "best", "nice", "enjoy", "enjoying", "ready", "proud", "confident",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "unhappy", "bad", "terrible", "awful", "tired", "exhausted", "stressed", "anxious",
    "angry", "upset", "depressed", "lonely", "bored", "worried", "nervous", "hate", "miserable",
    "down", "low", "drained", "overwhelmed", "frustrated", "sick", "worst", "gloomy", "hurt",
    "burned", "burnt", "cry", "crying", "afraid", "scared",
];

const NEGATIONS: &[&str] = &["not", "never", "no", "nor", "cannot"];

/// Word-list sentiment scorer with simple negation handling
#[derive(Debug, Clone)]
pub struct LexiconSentiment {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl LexiconSentiment {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }

    /// Net sentiment score of `text`
    pub fn score(&self, text: &str) -> i32 {
        let mut total = 0;
        let mut negate = false;

        for raw in text.to_lowercase().split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
            if raw.is_empty() {
                continue;
            }
            if NEGATIONS.contains(&raw) || raw.ends_with("n't") {
                negate = true;
                continue;
            }
            let word = raw.trim_matches('\'');
            let polarity = if self.positive.contains(word) {
                1
            } else if self.negative.contains(word) {
                -1
            } else {
                continue;
            };
            total += if negate { -polarity } else { polarity };
            negate = false;
        }
        total
    }
}

impl Default for LexiconSentiment {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for LexiconSentiment {
    fn analyze(&self, text: &str) -> Mood {
        if text.trim().is_empty() {
            return Mood::Neutral;
        }
        let score = self.score(text);
        let mood = match score {
            s if s > 0 => Mood::Positive,
            s if s < 0 => Mood::Negative,
            _ => Mood::Neutral,
        };
        debug!(score, mood = %mood, "Analyzed sentiment");
        mood
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_sentiment() {
        let analyzer = LexiconSentiment::new();
        assert_eq!(analyzer.analyze("I am very happy today!"), Mood::Positive);
        assert_eq!(analyzer.analyze("Feeling sad today"), Mood::Negative);
    }

    #[test]
    fn test_negation_flips() {
        let analyzer = LexiconSentiment::new();
        assert_eq!(analyzer.analyze("I am not happy"), Mood::Negative);
        assert_eq!(analyzer.analyze("I don't feel bad at all"), Mood::Positive);
        assert_eq!(analyzer.analyze("never bored"), Mood::Positive);
    }

    #[test]
    fn test_blank_and_unknown_are_neutral() {
        let analyzer = LexiconSentiment::new();
        assert_eq!(analyzer.analyze("   "), Mood::Neutral);
        assert_eq!(analyzer.analyze("the weather report"), Mood::Neutral);
        assert_eq!(analyzer.analyze("happy but tired"), Mood::Neutral);
    }
}
