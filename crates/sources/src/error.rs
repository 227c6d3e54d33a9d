//! Error types for the score sources.

use data_loader::DataLoadError;
use thiserror::Error;

/// Errors raised while building, loading or persisting score sources
#[derive(Error, Debug)]
pub enum SourceError {
    /// A persisted artifact is missing or unreadable
    #[error("Artifact {path} unavailable: {reason}")]
    Artifact { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Loaded parts disagree on row counts or dimensionality
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("No interaction data matches the activity catalog")]
    NoInteractions,

    #[error("Invalid latent dimensionality: {0}")]
    InvalidFactorCount(usize),

    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
}

pub type Result<T> = std::result::Result<T, SourceError>;
