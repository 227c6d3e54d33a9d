//! Offline evaluation: leave-last-out hit rate and latent RMSE.
//!
//! ## Protocol
//! 1. Each user's last logged interaction is held out as the test item
//! 2. Latent factors are trained on the remaining events
//! 3. For every blend weight, each test user gets a top-N list
//!    (seen items kept, no mood, stored profile as interest text)
//! 4. precision@k = share of users whose held-out item is in their first k
//! 5. RMSE compares the held-out rating (1 when absent) with the predicted
//!    latent score, over users whose held-out item made the list with a
//!    latent score

use crate::ranker::{RankRequest, Ranker};
use crate::scorer::HybridScorer;
use anyhow::Result;
use data_loader::InteractionEvent;
use rayon::prelude::*;
use serde::Serialize;
use sources::{CorpusIndex, LatentFactorStore, SourceError, UserContext, train_latent_factors};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// Training and test events for one evaluation run
#[derive(Debug, Clone, Default)]
pub struct HoldoutSplit {
    pub train: Vec<InteractionEvent>,
    /// One event per user, in log order
    pub test: Vec<InteractionEvent>,
}

/// Hold out every user's last event (log order).
pub fn leave_last_out(events: &[InteractionEvent]) -> HoldoutSplit {
    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (i, event) in events.iter().enumerate() {
        last_index.insert(event.user_id.as_str(), i);
    }

    let mut split = HoldoutSplit::default();
    for (i, event) in events.iter().enumerate() {
        if last_index.get(event.user_id.as_str()) == Some(&i) {
            split.test.push(event.clone());
        } else {
            split.train.push(event.clone());
        }
    }
    split
}

/// 1 if `true_id` is among the first `k` recommended IDs, else 0
pub fn precision_at_k(recommended: &[&str], true_id: &str, k: usize) -> f32 {
    if recommended.iter().take(k).any(|id| *id == true_id) {
        1.0
    } else {
        0.0
    }
}

/// Root mean squared error of (actual, predicted) pairs; `None` if empty
pub fn rmse(pairs: &[(f32, f32)]) -> Option<f32> {
    if pairs.is_empty() {
        return None;
    }
    let mse = pairs
        .iter()
        .map(|(actual, predicted)| (actual - predicted).powi(2))
        .sum::<f32>()
        / pairs.len() as f32;
    Some(mse.sqrt())
}

/// Grid and cut-offs for an evaluation run
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub alphas: Vec<f32>,
    pub factors: Vec<usize>,
    pub ks: Vec<usize>,
    /// Length of each recommendation list
    pub depth: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            alphas: vec![0.2, 0.5, 0.8],
            factors: vec![20, 50, 100],
            ks: vec![1, 3, 5],
            depth: 10,
        }
    }
}

/// Metrics for one (n_factors, alpha) cell of the grid
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub n_factors: usize,
    pub alpha: f32,
    /// k -> precision@k
    pub precision: BTreeMap<usize, f32>,
    pub rmse: Option<f32>,
    pub test_users: usize,
}

/// Metrics for a single model and blend weight over the held-out events.
pub fn evaluate(
    corpus: &CorpusIndex,
    latent: Option<&LatentFactorStore>,
    test: &[InteractionEvent],
    alpha: f32,
    ks: &[usize],
    depth: usize,
) -> Result<(BTreeMap<usize, f32>, Option<f32>)> {
    let scorer = HybridScorer::new(corpus, latent);
    let ranker = Ranker::new();
    let request = RankRequest {
        alpha,
        filter_seen: false,
        top_k: depth,
        ..Default::default()
    };

    let mut hits: BTreeMap<usize, f32> = ks.iter().map(|&k| (k, 0.0)).collect();
    let mut pairs = Vec::new();

    for event in test {
        let scores = scorer.score(&event.user_id, None, None);
        let context = UserContext::new(event.user_id.clone());
        let recs = ranker.rank(corpus.catalog(), &scores, &request, &context)?;
        let ids: Vec<&str> = recs.iter().map(|r| r.activity_id.as_str()).collect();

        for (&k, total) in hits.iter_mut() {
            *total += precision_at_k(&ids, &event.activity_id, k);
        }

        if let Some(predicted) = recs
            .iter()
            .find(|r| r.activity_id == event.activity_id)
            .and_then(|r| r.cf_score)
        {
            pairs.push((event.weight(), predicted));
        }
    }

    let n = test.len().max(1) as f32;
    let precision = hits.into_iter().map(|(k, total)| (k, total / n)).collect();
    Ok((precision, rmse(&pairs)))
}

/// Run the full (n_factors x alpha) grid with leave-last-out.
pub fn evaluate_grid(
    corpus: &CorpusIndex,
    events: &[InteractionEvent],
    config: &EvaluationConfig,
) -> Result<Vec<EvaluationResult>> {
    let split = leave_last_out(events);
    info!(
        "Evaluating on {} held-out users ({} training events)",
        split.test.len(),
        split.train.len()
    );

    let mut results = Vec::with_capacity(config.factors.len() * config.alphas.len());
    for &n_factors in &config.factors {
        let latent = match train_latent_factors(&split.train, corpus.catalog(), n_factors) {
            Ok(store) => Some(store),
            Err(SourceError::NoInteractions) => {
                warn!("No training interactions left after holdout, evaluating content only");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let cells: Result<Vec<EvaluationResult>> = config
            .alphas
            .par_iter()
            .map(|&alpha| {
                let (precision, rmse) = evaluate(
                    corpus,
                    latent.as_ref(),
                    &split.test,
                    alpha,
                    &config.ks,
                    config.depth,
                )?;
                Ok(EvaluationResult {
                    n_factors,
                    alpha,
                    precision,
                    rmse,
                    test_users: split.test.len(),
                })
            })
            .collect();
        results.extend(cells?);
    }
    Ok(results)
}
