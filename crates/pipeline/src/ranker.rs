//! Ranker - blend, filter and order the final recommendations
//!
//! ## Algorithm
//! 1. Min-max normalize content and latent scores over the whole catalog
//! 2. final = alpha * content + (1 - alpha) * latent
//! 3. Start from every activity in catalog order, narrow by city and tags
//! 4. Drop seen activities when requested
//! 5. Stable sort by final score, descending (ties keep catalog order)
//! 6. Keep the first `top_k`

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AlreadySeenFilter, CityFilter, TagFilter};
use crate::normalize::{blend, min_max_normalize};
use crate::scorer::ScoreBreakdown;
use anyhow::{Result, ensure};
use data_loader::{ActivityId, Dataset};
use serde::{Deserialize, Serialize};
use sources::{Candidate, UserContext};
use tracing::{debug, instrument};

/// Blend weight used when a request does not override it
pub const DEFAULT_ALPHA: f32 = 0.6;

/// Largest accepted `top_k`
pub const MAX_TOP_K: usize = 50;

/// Ranking knobs for one request
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub alpha: f32,
    pub city: Option<String>,
    pub tags: Vec<String>,
    pub filter_seen: bool,
    pub top_k: usize,
}

impl Default for RankRequest {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            city: None,
            tags: Vec::new(),
            filter_seen: true,
            top_k: 5,
        }
    }
}

/// One ranked result with its score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub activity_id: ActivityId,
    pub title: String,
    pub tags: String,
    pub city: Option<String>,
    /// Blended, normalized score
    pub score: f32,
    /// Raw content score (after mood boost)
    pub content_score: f32,
    /// Raw latent score; null when the user has no latent signal
    pub cf_score: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker;

impl Ranker {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(user_id = %context.user_id, top_k = request.top_k))]
    pub fn rank(
        &self,
        catalog: &Dataset,
        scores: &ScoreBreakdown,
        request: &RankRequest,
        context: &UserContext,
    ) -> Result<Vec<Recommendation>> {
        let n = catalog.len();
        ensure!(
            scores.content.len() == n && scores.latent.scores.len() == n,
            "score vectors ({} content, {} latent) do not match catalog size {}",
            scores.content.len(),
            scores.latent.scores.len(),
            n
        );

        let content_norm = min_max_normalize(&scores.content);
        let latent_norm = min_max_normalize(&scores.latent.scores);
        let final_scores = blend(&content_norm, &latent_norm, request.alpha);

        let candidates: Vec<Candidate> = catalog
            .activities()
            .iter()
            .enumerate()
            .map(|(row, activity)| {
                let latent = scores.latent.has_signal.then(|| scores.latent.scores[row]);
                Candidate::new(row, activity.id.clone(), final_scores[row])
                    .with_components(scores.content[row], latent)
            })
            .collect();

        let pipeline = FilterPipeline::new()
            .add_optional(CityFilter::from_request(request.city.as_deref()))
            .add_optional(TagFilter::from_request(&request.tags))
            .add_optional(request.filter_seen.then_some(AlreadySeenFilter));

        let mut survivors = pipeline.apply(candidates, catalog, context)?;
        debug!("{} of {} activities survive filtering", survivors.len(), n);

        // sort_by is stable, so equal scores stay in catalog order
        survivors.sort_by(|a, b| b.score.total_cmp(&a.score));
        survivors.truncate(request.top_k);

        let activities = catalog.activities();
        let recommendations = survivors
            .into_iter()
            .map(|candidate| {
                let activity = &activities[candidate.row];
                Recommendation {
                    activity_id: candidate.activity_id,
                    title: activity.title.clone(),
                    tags: activity.tags.clone(),
                    city: activity.city.clone(),
                    score: candidate.score,
                    content_score: candidate.content_score,
                    cf_score: candidate.latent_score,
                }
            })
            .collect();

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Activity;
    use sources::LatentScores;

    fn catalog() -> Dataset {
        let rows = [
            ("a1", "hiking;outdoor", "NYC"),
            ("a2", "yoga;calm", "NYC"),
            ("a3", "running", "Boston"),
            ("a4", "dance", "NYC"),
        ];
        Dataset::from_activities(
            rows.iter()
                .map(|(id, tags, city)| Activity {
                    id: id.to_string(),
                    title: format!("Title {}", id),
                    tags: tags.to_string(),
                    city: Some(city.to_string()),
                })
                .collect(),
        )
        .unwrap()
    }

    fn breakdown(content: Vec<f32>, latent: Option<Vec<f32>>) -> ScoreBreakdown {
        let n = content.len();
        ScoreBreakdown {
            content,
            latent: match latent {
                Some(scores) => LatentScores {
                    scores,
                    has_signal: true,
                },
                None => LatentScores::none(n),
            },
        }
    }

    fn ids(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.activity_id.as_str()).collect()
    }

    #[test]
    fn test_ranks_by_blended_score() {
        let scores = breakdown(vec![0.9, 0.1, 0.5, 0.0], Some(vec![0.0, 2.0, 1.0, 0.5]));
        let request = RankRequest {
            alpha: 0.5,
            top_k: 4,
            ..Default::default()
        };
        let recs = Ranker::new()
            .rank(&catalog(), &scores, &request, &UserContext::new("u1"))
            .unwrap();

        assert_eq!(ids(&recs), vec!["a2", "a3", "a1", "a4"]);
        assert_eq!(recs[2].content_score, 0.9);
        assert_eq!(recs[2].cf_score, Some(0.0));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let scores = breakdown(vec![0.3, 0.3, 0.3, 0.3], None);
        let recs = Ranker::new()
            .rank(
                &catalog(),
                &scores,
                &RankRequest {
                    top_k: 3,
                    ..Default::default()
                },
                &UserContext::new("u1"),
            )
            .unwrap();
        assert_eq!(ids(&recs), vec!["a1", "a2", "a3"]);
        assert!(recs.iter().all(|r| r.score == 0.0 && r.cf_score.is_none()));
    }

    #[test]
    fn test_filters_and_seen() {
        let scores = breakdown(vec![0.9, 0.8, 0.7, 0.6], None);
        let context = UserContext::new("u1").with_seen(["a1".to_string()].into_iter().collect());
        let request = RankRequest {
            alpha: 1.0,
            city: Some("nyc".to_string()),
            top_k: 10,
            ..Default::default()
        };
        let recs = Ranker::new()
            .rank(&catalog(), &scores, &request, &context)
            .unwrap();
        assert_eq!(ids(&recs), vec!["a2", "a4"]);
    }

    #[test]
    fn test_no_survivors_is_empty() {
        let scores = breakdown(vec![0.1; 4], None);
        let request = RankRequest {
            city: Some("Atlantis".to_string()),
            ..Default::default()
        };
        let recs = Ranker::new()
            .rank(&catalog(), &scores, &request, &UserContext::new("u1"))
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_misaligned_scores_rejected() {
        let scores = breakdown(vec![0.1; 3], None);
        let result = Ranker::new().rank(
            &catalog(),
            &scores,
            &RankRequest::default(),
            &UserContext::new("u1"),
        );
        assert!(result.is_err());
    }
}
