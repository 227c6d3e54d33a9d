//! Per-request scoring: content scores (with mood boost) and latent scores.

use crate::mood::{Mood, apply_mood_boost};
use data_loader::Dataset;
use sources::{CorpusIndex, LatentFactorStore, LatentScores, latent_scores};
use tracing::{debug, instrument};

/// The two raw score vectors for one request, row-aligned with the catalog
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    /// Cosine similarity plus any mood boost
    pub content: Vec<f32>,
    pub latent: LatentScores,
}

/// Text the content scorer matches against.
///
/// A non-blank override wins; otherwise the stored profile's interests;
/// otherwise the empty string (cold start).
pub fn resolve_user_text(catalog: &Dataset, user_id: &str, interests_override: Option<&str>) -> String {
    if let Some(text) = interests_override.map(str::trim).filter(|t| !t.is_empty()) {
        return text.to_lowercase();
    }
    catalog
        .get_profile(user_id)
        .map(|profile| profile.profile_text())
        .unwrap_or_default()
}

/// Computes both score sources against one model snapshot
pub struct HybridScorer<'a> {
    corpus: &'a CorpusIndex,
    latent: Option<&'a LatentFactorStore>,
}

impl<'a> HybridScorer<'a> {
    pub fn new(corpus: &'a CorpusIndex, latent: Option<&'a LatentFactorStore>) -> Self {
        Self { corpus, latent }
    }

    pub fn catalog(&self) -> &'a Dataset {
        self.corpus.catalog()
    }

    #[instrument(skip(self, interests_override))]
    pub fn score(
        &self,
        user_id: &str,
        interests_override: Option<&str>,
        mood: Option<Mood>,
    ) -> ScoreBreakdown {
        let catalog = self.corpus.catalog();
        let text = resolve_user_text(catalog, user_id, interests_override);
        if text.is_empty() {
            debug!("No interest text, content scores start at zero");
        }

        let mut content = self.corpus.content_scores(&text);
        apply_mood_boost(&mut content, catalog, mood);

        let latent = latent_scores(self.latent, user_id, catalog);
        if !latent.has_signal {
            debug!("No latent signal for user");
        }

        ScoreBreakdown { content, latent }
    }
}
