//! # Recommendation Service
//!
//! Owns the loaded score sources and answers recommendation requests.
//!
//! The models live in an immutable [`ModelSnapshot`]. A request clones the
//! current `Arc` and runs the whole scoring pass against it, so a retrain
//! that swaps in a new snapshot never disturbs requests already in flight.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use crate::config::Config;
use data_loader::{Dataset, InteractionEvent, InteractionLog};
use pipeline::{
    HybridScorer, LexiconSentiment, Mood, RankRequest, Ranker, Recommendation, SentimentAnalyzer,
};
use sources::{
    ArtifactStore, CorpusIndex, LatentFactorStore, MAX_N_FACTORS, MIN_N_FACTORS, UserContext,
    train_latent_factors,
};

/// The score sources a request is answered from
#[derive(Debug)]
pub struct ModelSnapshot {
    pub corpus: Arc<CorpusIndex>,
    pub latent: Option<LatentFactorStore>,
}

/// Everything one recommendation call needs, already validated
#[derive(Debug, Clone, Default)]
pub struct RecommendParams {
    pub user_id: String,
    pub top_k: usize,
    pub mood: Option<Mood>,
    pub city: Option<String>,
    pub tags: Vec<String>,
    pub include_seen: bool,
    /// Falls back to the configured default when absent
    pub alpha: Option<f32>,
    pub interests_override: Option<String>,
}

pub struct RecommendationService {
    snapshot: RwLock<Arc<ModelSnapshot>>,
    log: Arc<InteractionLog>,
    artifacts: ArtifactStore,
    sentiment: Arc<dyn SentimentAnalyzer>,
    default_alpha: f32,
    /// Serializes retrains
    retrain_lock: tokio::sync::Mutex<()>,
}

impl RecommendationService {
    /// Load (or build) the score sources and open the interaction log.
    ///
    /// Missing content artifacts are rebuilt from the catalog and persisted;
    /// if that fails the service cannot start. Missing or inconsistent
    /// latent artifacts only cost the collaborative signal.
    #[instrument(skip(config), fields(data_dir = ?config.data_dir, models_dir = ?config.models_dir))]
    pub fn initialize(config: &Config) -> Result<Self> {
        let start = Instant::now();
        let artifacts = ArtifactStore::new(&config.models_dir);

        let corpus = load_or_build_corpus(&artifacts, &config.data_dir)?;
        let latent = load_latent(&artifacts, &corpus);
        let log = InteractionLog::open(config.interactions_path())
            .context("Failed to open interaction log")?;

        info!(
            "Service ready in {:?}: {} activities, latent signal {}, {} logged interactions",
            start.elapsed(),
            corpus.len(),
            if latent.is_some() { "on" } else { "off" },
            log.len()
        );

        Ok(Self::from_parts(
            ModelSnapshot {
                corpus: Arc::new(corpus),
                latent,
            },
            Arc::new(log),
            artifacts,
            config.default_alpha,
        ))
    }

    pub fn from_parts(
        snapshot: ModelSnapshot,
        log: Arc<InteractionLog>,
        artifacts: ArtifactStore,
        default_alpha: f32,
    ) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            log,
            artifacts,
            sentiment: Arc::new(LexiconSentiment::new()),
            default_alpha,
            retrain_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_sentiment(mut self, sentiment: Arc<dyn SentimentAnalyzer>) -> Self {
        self.sentiment = sentiment;
        self
    }

    /// Current models. The lock is held only long enough to clone the `Arc`.
    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn interactions(&self) -> &InteractionLog {
        &self.log
    }

    pub fn analyze_mood(&self, text: &str) -> Mood {
        self.sentiment.analyze(text)
    }

    /// One synchronous scoring and ranking pass.
    ///
    /// An empty result is not an error; callers decide how to surface it.
    #[instrument(skip(self, params), fields(user_id = %params.user_id, top_k = params.top_k))]
    pub fn recommend(&self, params: &RecommendParams) -> Result<Vec<Recommendation>> {
        let snapshot = self.snapshot();
        let scorer = HybridScorer::new(&snapshot.corpus, snapshot.latent.as_ref());
        let scores = scorer.score(
            &params.user_id,
            params.interests_override.as_deref(),
            params.mood,
        );

        let context =
            UserContext::new(params.user_id.as_str()).with_seen(self.log.seen_by(&params.user_id));
        let request = RankRequest {
            alpha: params.alpha.unwrap_or(self.default_alpha),
            city: params.city.clone(),
            tags: params.tags.clone(),
            filter_seen: !params.include_seen,
            top_k: params.top_k,
        };

        Ranker::new().rank(snapshot.corpus.catalog(), &scores, &request, &context)
    }

    /// Validate and append one event. It counts as seen from the next request on.
    pub fn log_interaction(&self, event: InteractionEvent) -> data_loader::Result<()> {
        self.log.append(event)
    }

    /// Retrain the latent factors from the full interaction log, persist
    /// them, then swap them in.
    ///
    /// Training runs on the blocking pool. Concurrent calls queue up.
    pub async fn retrain(&self, n_factors: usize) -> Result<()> {
        ensure!(
            (MIN_N_FACTORS..=MAX_N_FACTORS).contains(&n_factors),
            "n_factors must be between {} and {}",
            MIN_N_FACTORS,
            MAX_N_FACTORS
        );

        let _guard = self.retrain_lock.lock().await;
        let start = Instant::now();

        let corpus = Arc::clone(&self.snapshot().corpus);
        let events = self.log.events();
        let artifacts = self.artifacts.clone();
        let training_corpus = Arc::clone(&corpus);

        let latent = tokio::task::spawn_blocking(move || -> Result<LatentFactorStore> {
            let latent = train_latent_factors(&events, training_corpus.catalog(), n_factors)?;
            artifacts.save_latent(&latent)?;
            Ok(latent)
        })
        .await
        .context("Retraining task panicked")??;

        info!(
            "Retrained latent factors (k = {}, {} users) in {:?}",
            latent.dimensions(),
            latent.user_count(),
            start.elapsed()
        );

        *self.snapshot.write() = Arc::new(ModelSnapshot {
            corpus,
            latent: Some(latent),
        });
        Ok(())
    }
}

fn load_or_build_corpus(artifacts: &ArtifactStore, data_dir: &Path) -> Result<CorpusIndex> {
    if artifacts.content_exists() {
        let profiles = Dataset::load_profiles(data_dir).context("Failed to load user profiles")?;
        return artifacts
            .load_content(profiles)
            .context("Failed to load content artifacts");
    }

    info!("No content artifacts in {:?}, building from catalog", artifacts.dir());
    let catalog = Dataset::load_from_files(data_dir).context("Failed to load activity catalog")?;
    let corpus = CorpusIndex::build(catalog);
    artifacts
        .save_content(&corpus)
        .context("Failed to persist content artifacts")?;
    Ok(corpus)
}

fn load_latent(artifacts: &ArtifactStore, corpus: &CorpusIndex) -> Option<LatentFactorStore> {
    if !artifacts.latent_exists() {
        warn!("No latent factor artifacts found, serving without collaborative signal");
        return None;
    }
    match artifacts.load_latent() {
        Ok(latent) if latent.item_count() == corpus.len() => Some(latent),
        Ok(latent) => {
            warn!(
                "Latent factors cover {} items but the catalog has {}, ignoring them",
                latent.item_count(),
                corpus.len()
            );
            None
        }
        Err(e) => {
            warn!("Failed to load latent factor artifacts: {}", e);
            None
        }
    }
}
