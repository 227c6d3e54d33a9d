use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Dataset, EventKind, InteractionEvent};
use pipeline::{
    evaluate_grid, EvaluationConfig, EvaluationResult, LexiconSentiment, Mood, Recommendation,
    SentimentAnalyzer, MAX_TOP_K,
};
use server::{Config, RecommendParams, RecommendationService};
use sources::{ArtifactStore, CorpusIndex, MAX_N_FACTORS, MIN_N_FACTORS};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// ActiReco - hybrid activity recommender
#[derive(Parser)]
#[command(name = "actireco")]
#[command(about = "Activity recommendations blending content similarity and collaborative filtering", long_about = None)]
struct Cli {
    /// Directory with activities.csv, users.csv and interactions.csv
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for persisted model artifacts
    #[arg(long, default_value = "models")]
    models_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the TF-IDF corpus index from the catalog and persist it
    BuildIndex,

    /// Train latent factors from the interaction log and persist them
    TrainCf {
        #[arg(long, default_value_t = sources::DEFAULT_N_FACTORS)]
        n_factors: usize,
    },

    /// Get activity recommendations for a user
    Recommend {
        #[arg(long)]
        user_id: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Free-text interests used instead of the stored profile
        #[arg(long)]
        interests: Option<String>,

        /// Mood label: positive, negative or neutral
        #[arg(long)]
        mood: Option<Mood>,

        /// Free text to derive the mood from (ignored when --mood is given)
        #[arg(long)]
        mood_text: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// Required tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Content weight in [0, 1]
        #[arg(long)]
        alpha: Option<f32>,

        /// Keep activities the user has already interacted with
        #[arg(long)]
        include_seen: bool,
    },

    /// Append an interaction to the log
    Log {
        #[arg(long)]
        user_id: String,

        #[arg(long)]
        activity_id: String,

        /// view, click, like or rate
        #[arg(long, default_value = "view")]
        event: EventKind,

        /// 1-5, required for rate
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,
    },

    /// Classify free text as positive, negative or neutral
    Sentiment {
        #[arg(long)]
        text: String,
    },

    /// Leave-last-out evaluation over a grid of factor counts and blend weights
    Evaluate {
        #[arg(long, value_delimiter = ',', default_value = "0.2,0.5,0.8")]
        alphas: Vec<f32>,

        #[arg(long, value_delimiter = ',', default_value = "20,50,100")]
        factors: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    debug!(data_dir = ?cli.data_dir, models_dir = ?cli.models_dir, "Resolved directories");
    let config = Config {
        data_dir: cli.data_dir,
        models_dir: cli.models_dir,
        ..Config::default()
    };

    match cli.command {
        Commands::BuildIndex => handle_build_index(&config)?,
        Commands::TrainCf { n_factors } => handle_train_cf(&config, n_factors).await?,
        Commands::Recommend {
            user_id,
            limit,
            interests,
            mood,
            mood_text,
            city,
            tags,
            alpha,
            include_seen,
        } => {
            if !(1..=MAX_TOP_K).contains(&limit) {
                bail!("--limit must be between 1 and {}", MAX_TOP_K);
            }
            if let Some(alpha) = alpha {
                if !(0.0..=1.0).contains(&alpha) {
                    bail!("--alpha must be between 0 and 1");
                }
            }
            let service = load_service(&config)?;
            let mood = mood.or_else(|| {
                mood_text
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(|text| service.analyze_mood(text))
            });
            let params = RecommendParams {
                user_id,
                top_k: limit,
                mood,
                city,
                tags,
                include_seen,
                alpha,
                interests_override: interests,
            };
            handle_recommend(&service, &params)?
        }
        Commands::Log {
            user_id,
            activity_id,
            event,
            rating,
        } => handle_log(&config, user_id, activity_id, event, rating)?,
        Commands::Sentiment { text } => handle_sentiment(&text)?,
        Commands::Evaluate { alphas, factors } => handle_evaluate(&config, alphas, factors)?,
    }

    Ok(())
}

fn load_service(config: &Config) -> Result<RecommendationService> {
    let start = Instant::now();
    let service =
        RecommendationService::initialize(config).context("Failed to load recommendation models")?;
    println!(
        "{} Loaded {} activities in {:?}",
        "✓".green(),
        service.snapshot().corpus.len(),
        start.elapsed()
    );
    Ok(service)
}

/// Handle the 'build-index' command
fn handle_build_index(config: &Config) -> Result<()> {
    let start = Instant::now();
    let catalog = Dataset::load_from_files(&config.data_dir)
        .with_context(|| format!("Failed to load catalog from {}", config.data_dir.display()))?;
    let corpus = CorpusIndex::build(catalog);

    ArtifactStore::new(&config.models_dir)
        .save_content(&corpus)
        .context("Failed to save content artifacts")?;
    info!(
        activities = corpus.len(),
        terms = corpus.vectorizer().vocabulary_size(),
        "Content artifacts written"
    );

    println!(
        "{} Indexed {} activities ({} terms) into {} in {:?}",
        "✓".green(),
        corpus.len(),
        corpus.vectorizer().vocabulary_size(),
        config.models_dir.display(),
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'train-cf' command
async fn handle_train_cf(config: &Config, n_factors: usize) -> Result<()> {
    if !(MIN_N_FACTORS..=MAX_N_FACTORS).contains(&n_factors) {
        bail!(
            "--n-factors must be between {} and {}",
            MIN_N_FACTORS,
            MAX_N_FACTORS
        );
    }
    let service = load_service(config)?;
    let start = Instant::now();
    service
        .retrain(n_factors)
        .await
        .context("CF retraining failed")?;

    let snapshot = service.snapshot();
    if let Some(latent) = &snapshot.latent {
        println!(
            "{} Trained {} factors for {} users x {} activities in {:?}",
            "✓".green(),
            latent.dimensions(),
            latent.user_count(),
            latent.item_count(),
            start.elapsed()
        );
    }
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(service: &RecommendationService, params: &RecommendParams) -> Result<()> {
    let recommendations = service.recommend(params)?;
    if recommendations.is_empty() {
        println!(
            "{}",
            format!("No recommendations found for user {}", params.user_id).yellow()
        );
        return Ok(());
    }
    print_recommendations(&params.user_id, params.mood, &recommendations);
    Ok(())
}

/// Handle the 'log' command
fn handle_log(
    config: &Config,
    user_id: String,
    activity_id: String,
    event: EventKind,
    rating: Option<u8>,
) -> Result<()> {
    let log = data_loader::InteractionLog::open(config.interactions_path())?;
    let mut interaction = InteractionEvent::new(user_id, activity_id, event);
    interaction.rating = rating;
    log.append(interaction.clone())?;
    info!(path = ?log.path(), total = log.len(), "Interaction appended");

    println!(
        "{} Logged {} of {} by {} ({} events total)",
        "✓".green(),
        interaction.event,
        interaction.activity_id.bold(),
        interaction.user_id,
        log.len()
    );
    Ok(())
}

/// Handle the 'sentiment' command
fn handle_sentiment(text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Text cannot be empty");
    }
    let mood = LexiconSentiment::new().analyze(text);
    let label = match mood {
        Mood::Positive => mood.as_str().green(),
        Mood::Negative => mood.as_str().red(),
        Mood::Neutral => mood.as_str().normal(),
    };
    println!("{}: {}", "Mood".bold(), label);
    Ok(())
}

/// Handle the 'evaluate' command
fn handle_evaluate(config: &Config, alphas: Vec<f32>, factors: Vec<usize>) -> Result<()> {
    if alphas.iter().any(|a| !(0.0..=1.0).contains(a)) {
        bail!("--alphas must all be between 0 and 1");
    }
    if factors
        .iter()
        .any(|f| !(MIN_N_FACTORS..=MAX_N_FACTORS).contains(f))
    {
        bail!(
            "--factors must all be between {} and {}",
            MIN_N_FACTORS,
            MAX_N_FACTORS
        );
    }

    let service = load_service(config)?;
    let events = service.interactions().events();
    if events.is_empty() {
        bail!("No interactions to evaluate");
    }

    let eval_config = EvaluationConfig {
        alphas,
        factors,
        ..EvaluationConfig::default()
    };
    info!(
        events = events.len(),
        configurations = eval_config.alphas.len() * eval_config.factors.len(),
        "Starting leave-last-out evaluation"
    );
    let start = Instant::now();
    let results = evaluate_grid(&service.snapshot().corpus, &events, &eval_config)?;
    print_evaluation(&eval_config, &results);
    println!("Evaluated {} configurations in {:?}", results.len(), start.elapsed());
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(user_id: &str, mood: Option<Mood>, recommendations: &[Recommendation]) {
    let header = match mood {
        Some(mood) => format!("Recommendations for {} (mood: {}):", user_id, mood),
        None => format!("Recommendations for {}:", user_id),
    };
    println!("{}", header.bold().blue());

    for (i, rec) in recommendations.iter().enumerate() {
        let title = if rec.title.is_empty() { &rec.activity_id } else { &rec.title };
        let city = rec.city.as_deref().unwrap_or("anywhere");
        println!(
            "{}. {} [{}] {} - Score: {:.3}",
            (i + 1).to_string().green(),
            title,
            rec.tags,
            city.dimmed(),
            rec.score
        );
        let cf = rec
            .cf_score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "n/a".to_string());
        println!("   content {:.3} | cf {}", rec.content_score, cf);
    }
}

fn print_evaluation(config: &EvaluationConfig, results: &[EvaluationResult]) {
    println!("{}", "Leave-last-out evaluation:".bold().blue());
    let ks: Vec<String> = config.ks.iter().map(|k| format!("P@{:<4}", k)).collect();
    println!("{:>9} {:>6} {} {:>8}", "n_factors", "alpha", ks.join(" "), "RMSE");
    for result in results {
        let precision: Vec<String> = config
            .ks
            .iter()
            .map(|k| format!("{:<6.3}", result.precision.get(k).copied().unwrap_or(0.0)))
            .collect();
        let rmse = result
            .rmse
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:>9} {:>6.2} {} {:>8}",
            result.n_factors,
            result.alpha,
            precision.join(" "),
            rmse
        );
    }
    if let Some(first) = results.first() {
        println!("{} held-out users", first.test_users);
    }
}
