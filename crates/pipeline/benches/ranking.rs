//! Benchmarks for the per-request ranking pass
//!
//! Run with: cargo bench --package pipeline

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{Activity, Dataset, EventKind, InteractionEvent};
use pipeline::{HybridScorer, Mood, RankRequest, Ranker};
use sources::{CorpusIndex, UserContext, train_latent_factors};

const TAGS: [&str; 6] = [
    "hiking;outdoor",
    "yoga;calm",
    "running;sports",
    "dance;music",
    "meditation;relax",
    "cooking;social",
];

fn setup(n: usize) -> (CorpusIndex, sources::LatentFactorStore) {
    let activities = (0..n)
        .map(|i| Activity {
            id: format!("a{}", i),
            title: format!("Activity {}", i),
            tags: TAGS[i % TAGS.len()].to_string(),
            city: Some(["NYC", "Austin"][i % 2].to_string()),
        })
        .collect();
    let catalog = Dataset::from_activities(activities).expect("Failed to build catalog");
    let events: Vec<InteractionEvent> = (0..100)
        .flat_map(|u| {
            (0..5).map(move |j| {
                InteractionEvent::new(format!("u{}", u), format!("a{}", (u * 11 + j * 17) % n), EventKind::Click)
            })
        })
        .collect();
    let latent = train_latent_factors(&events, &catalog, 20).expect("Failed to train factors");
    (CorpusIndex::build(catalog), latent)
}

fn bench_recommend(c: &mut Criterion) {
    let (corpus, latent) = setup(1_000);
    let scorer = HybridScorer::new(&corpus, Some(&latent));
    let ranker = Ranker::new();
    let context = UserContext::new("u1");
    let request = RankRequest {
        city: Some("NYC".to_string()),
        top_k: 10,
        ..Default::default()
    };

    c.bench_function("score_and_rank_1k", |b| {
        b.iter(|| {
            let scores = scorer.score(black_box("u1"), Some("hiking outdoor"), Some(Mood::Positive));
            let recs = ranker
                .rank(corpus.catalog(), &scores, black_box(&request), &context)
                .unwrap();
            black_box(recs)
        })
    });
}

criterion_group!(benches, bench_recommend);
criterion_main!(benches);
