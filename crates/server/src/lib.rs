//! Server crate for the ActiReco activity recommender.
//!
//! This crate wires the score sources and the ranking pipeline into a
//! long-lived [`RecommendationService`] and exposes it over HTTP.
//!
//! ## Main Components
//!
//! - **config**: environment-driven settings (`.env` aware)
//! - **service**: model snapshot, recommend / log / retrain operations
//! - **api**: axum router, request schemas and extractors
//! - **metrics**: per-endpoint request counters and latency middleware
//! - **error**: `AppError`, rendered as `{"status": "error", "detail": ...}`

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;

pub use api::{AppState, router};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use metrics::Metrics;
pub use service::{ModelSnapshot, RecommendParams, RecommendationService};
