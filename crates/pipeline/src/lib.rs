//! Hybrid scoring and ranking pipeline for activity recommendations.
//!
//! This crate provides:
//! - Mood labels, the mood boost and a pluggable sentiment analyzer
//! - Min-max normalization and alpha blending of score vectors
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - Ranker producing the final top-K with a score breakdown
//! - Offline leave-last-out evaluation
//!
//! ## Architecture
//! A request flows through the pipeline in stages:
//! 1. HybridScorer computes raw content and latent scores for every activity
//! 2. The mood boost nudges matching content scores
//! 3. Ranker normalizes, blends, filters (city, tags, seen) and sorts
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{HybridScorer, Ranker, RankRequest, Mood};
//! use sources::UserContext;
//!
//! let scorer = HybridScorer::new(&corpus, latent.as_ref());
//! let scores = scorer.score("u1", None, Some(Mood::Positive));
//!
//! let request = RankRequest { city: Some("NYC".into()), ..Default::default() };
//! let context = UserContext::new("u1").with_seen(log.seen_by("u1"));
//! let recs = Ranker::new().rank(corpus.catalog(), &scores, &request, &context)?;
//! ```

pub mod evaluation;
pub mod filter_pipeline;
pub mod filters;
pub mod mood;
pub mod normalize;
pub mod ranker;
pub mod scorer;
pub mod sentiment;
pub mod traits;

// Re-export main types
pub use evaluation::{EvaluationConfig, EvaluationResult, evaluate_grid, leave_last_out};
pub use filter_pipeline::FilterPipeline;
pub use mood::{MOOD_BOOST, Mood, apply_mood_boost};
pub use normalize::{blend, min_max_normalize};
pub use ranker::{DEFAULT_ALPHA, MAX_TOP_K, RankRequest, Ranker, Recommendation};
pub use scorer::{HybridScorer, ScoreBreakdown, resolve_user_text};
pub use sentiment::{LexiconSentiment, SentimentAnalyzer};
pub use traits::Filter;
