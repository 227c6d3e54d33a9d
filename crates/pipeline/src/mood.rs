//! Mood labels and the content-score boost they trigger.
//!
//! A mood nudges the content score of activities whose tags match the
//! mood's keyword list. The boost is added to the raw content score, before
//! normalization.

use anyhow::{Result, anyhow};
use data_loader::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Amount added to the content score of a matching activity
pub const MOOD_BOOST: f32 = 0.15;

const POSITIVE_KEYWORDS: &[&str] = &[
    "hiking",
    "sports",
    "dance",
    "football",
    "gaming",
    "running",
    "cycling",
    "active",
    "adventure",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "yoga",
    "meditation",
    "journaling",
    "relax",
    "calm",
    "mindfulness",
    "therapy",
    "spa",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    Negative,
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Positive => "positive",
            Mood::Negative => "negative",
            Mood::Neutral => "neutral",
        }
    }

    /// Tag keywords boosted under this mood
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Positive => POSITIVE_KEYWORDS,
            Mood::Negative => NEGATIVE_KEYWORDS,
            Mood::Neutral => &[],
        }
    }

    /// True if any keyword occurs as a substring of the lowercased tags
    pub fn matches_tags(&self, tags_lower: &str) -> bool {
        self.keywords().iter().any(|kw| tags_lower.contains(kw))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Mood::Positive),
            "negative" => Ok(Mood::Negative),
            "neutral" => Ok(Mood::Neutral),
            other => Err(anyhow!("Unknown mood '{}'", other)),
        }
    }
}

/// Add [`MOOD_BOOST`] to every activity whose tags match the mood.
///
/// `content` is row-aligned with `catalog`. No mood, or a neutral mood,
/// leaves the scores untouched.
pub fn apply_mood_boost(content: &mut [f32], catalog: &Dataset, mood: Option<Mood>) {
    let Some(mood) = mood else {
        return;
    };
    if mood.keywords().is_empty() {
        return;
    }

    let mut boosted = 0usize;
    for (score, activity) in content.iter_mut().zip(catalog.activities()) {
        if mood.matches_tags(&activity.tags_lower()) {
            *score += MOOD_BOOST;
            boosted += 1;
        }
    }
    debug!(mood = %mood, boosted, "Applied mood boost");
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Activity;

    fn catalog() -> Dataset {
        let rows = [
            ("a1", "Hiking;Outdoor"),
            ("a2", "yoga;calm"),
            ("a3", "cooking"),
            ("a4", "spa day"),
        ];
        Dataset::from_activities(
            rows.iter()
                .map(|(id, tags)| Activity {
                    id: id.to_string(),
                    title: String::new(),
                    tags: tags.to_string(),
                    city: None,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_positive_boosts_hiking() {
        let mut content = vec![0.2, 0.5, 0.1, 0.0];
        apply_mood_boost(&mut content, &catalog(), Some(Mood::Positive));
        assert!((content[0] - 0.35).abs() < 1e-6);
        assert_eq!(&content[1..], &[0.5, 0.1, 0.0]);
    }

    #[test]
    fn test_negative_boosts_each_match_once() {
        let mut content = vec![0.0; 4];
        apply_mood_boost(&mut content, &catalog(), Some(Mood::Negative));
        // "yoga;calm" matches two keywords but gets a single boost
        assert_eq!(content, vec![0.0, MOOD_BOOST, 0.0, MOOD_BOOST]);
    }

    #[test]
    fn test_neutral_and_absent_are_no_ops() {
        let original = vec![0.3, 0.2, 0.1, 0.0];
        let mut content = original.clone();
        apply_mood_boost(&mut content, &catalog(), Some(Mood::Neutral));
        apply_mood_boost(&mut content, &catalog(), None);
        assert_eq!(content, original);
    }

    #[test]
    fn test_parse_mood() {
        assert_eq!(" Positive ".parse::<Mood>().unwrap(), Mood::Positive);
        assert!("ecstatic".parse::<Mood>().is_err());
    }
}
