//! # Sources Crate
//!
//! This crate implements the two score sources behind activity
//! recommendations.
//!
//! ## Components
//!
//! ### Corpus Index (content)
//! TF-IDF vectors over each activity's title and tags:
//! - Cosine similarity between the user's interest text and every activity
//! - Blank or unknown text scores zero everywhere
//!
//! ### Latent Factor Store (collaborative)
//! Truncated SVD of the user-activity interaction matrix:
//! - Dot product of the user's factor row with every activity's row
//! - Unknown users get a zero vector flagged as "no latent signal"
//!
//! ### Artifacts
//! Both sources persist as JSON files in a models directory and are
//! reloaded at start-up.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{ArtifactStore, CorpusIndex, train_latent_factors};
//! use data_loader::{Dataset, InteractionLog};
//! use std::path::Path;
//!
//! let catalog = Dataset::load_from_files(Path::new("data"))?;
//! let corpus = CorpusIndex::build(catalog);
//! let log = InteractionLog::open("data/interactions.csv")?;
//! let latent = train_latent_factors(&log.events(), corpus.catalog(), 50)?;
//!
//! let store = ArtifactStore::new("models");
//! store.save_content(&corpus)?;
//! store.save_latent(&latent)?;
//!
//! let content = corpus.content_scores("hiking outdoor");
//! let collaborative = latent.latent_scores("u1", corpus.catalog());
//! ```

// Public modules
pub mod artifacts;
pub mod corpus;
pub mod error;
pub mod latent;
pub mod training;
pub mod types;
pub mod vectorizer;

// Re-export commonly used types
pub use artifacts::ArtifactStore;
pub use corpus::CorpusIndex;
pub use error::{Result, SourceError};
pub use latent::{LatentFactorStore, LatentScores, latent_scores};
pub use training::{
    DEFAULT_N_FACTORS, LatentFactorTrainer, MAX_N_FACTORS, MIN_N_FACTORS, train_latent_factors,
};
pub use types::{Candidate, UserContext};
pub use vectorizer::{SparseVector, TfidfVectorizer};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Activity, Dataset, EventKind, InteractionEvent};

    fn catalog() -> Dataset {
        Dataset::from_activities(vec![
            Activity {
                id: "a1".to_string(),
                title: "".to_string(),
                tags: "hiking outdoor".to_string(),
                city: Some("NYC".to_string()),
            },
            Activity {
                id: "a2".to_string(),
                title: "".to_string(),
                tags: "yoga calm".to_string(),
                city: Some("NYC".to_string()),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_both_sources_align_with_catalog() {
        let corpus = CorpusIndex::build(catalog());
        let events = vec![
            InteractionEvent::new("u1", "a1", EventKind::Like),
            InteractionEvent::new("u2", "a2", EventKind::Like),
        ];
        let latent = train_latent_factors(&events, corpus.catalog(), 2).unwrap();

        let content = corpus.content_scores("hiking");
        let collaborative = latent.latent_scores("u1", corpus.catalog());
        assert_eq!(content.len(), corpus.len());
        assert_eq!(collaborative.scores.len(), corpus.len());
        assert!(collaborative.has_signal);
    }

    #[test]
    fn test_candidate_creation() {
        let candidate = Candidate::new(0, "a1", 0.85).with_components(0.4, Some(1.2));
        assert_eq!(candidate.activity_id, "a1");
        assert_eq!(candidate.score, 0.85);
        assert_eq!(candidate.latent_score, Some(1.2));
    }

    #[test]
    fn test_user_context_seen() {
        let context = UserContext::new("u1").with_seen(["a1".to_string()].into_iter().collect());
        assert!(context.seen.contains("a1"));
        assert!(!context.seen.contains("a2"));
    }
}
