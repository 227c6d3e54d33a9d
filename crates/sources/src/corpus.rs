//! Corpus Index - content score source
//!
//! Holds the activity catalog together with one unit-normalized TF-IDF row
//! per activity (row-aligned with the catalog) and the fitted vectorizer.
//! Built offline; read-only while serving.

use crate::error::{Result, SourceError};
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use data_loader::{Activity, Dataset};
use tracing::{debug, info, instrument};

/// Precomputed content vectors for every activity in the catalog
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    catalog: Dataset,
    vectorizer: TfidfVectorizer,
    vectors: Vec<SparseVector>,
}

impl CorpusIndex {
    /// Fit the vectorizer on the catalog and vectorize every activity.
    pub fn build(catalog: Dataset) -> Self {
        let documents: Vec<String> = catalog
            .activities()
            .iter()
            .map(Activity::document_text)
            .collect();

        let vectorizer = TfidfVectorizer::fit(&documents);
        let vectors = vectorizer.transform_all(&documents);

        info!(
            "Built corpus index: {} activities, {} terms",
            vectors.len(),
            vectorizer.vocabulary_size()
        );

        Self {
            catalog,
            vectorizer,
            vectors,
        }
    }

    /// Reassemble an index from persisted parts.
    ///
    /// Fails if the vectors are not row-aligned with the catalog.
    pub fn from_parts(
        catalog: Dataset,
        vectorizer: TfidfVectorizer,
        vectors: Vec<SparseVector>,
    ) -> Result<Self> {
        if vectors.len() != catalog.len() {
            return Err(SourceError::ShapeMismatch(format!(
                "{} content vectors for {} activities",
                vectors.len(),
                catalog.len()
            )));
        }
        let vocabulary = vectorizer.vocabulary_size() as u32;
        if let Some(row) = vectors
            .iter()
            .position(|v| v.indices.iter().any(|&i| i >= vocabulary))
        {
            return Err(SourceError::ShapeMismatch(format!(
                "content vector {} references a term outside the vocabulary",
                row
            )));
        }
        Ok(Self {
            catalog,
            vectorizer,
            vectors,
        })
    }

    pub fn catalog(&self) -> &Dataset {
        &self.catalog
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Cosine similarity between `user_text` and every activity.
    ///
    /// The query row is unit-normalized by the vectorizer and the activity
    /// rows were normalized at build time, so each entry is a dot product.
    /// Blank or out-of-vocabulary text scores zero everywhere.
    #[instrument(skip(self, user_text), fields(text_len = user_text.len()))]
    pub fn content_scores(&self, user_text: &str) -> Vec<f32> {
        let query = self.vectorizer.transform(user_text);
        if query.is_empty() {
            debug!("User text has no known terms");
            return vec![0.0; self.vectors.len()];
        }
        self.vectors.iter().map(|row| row.dot(&query)).collect()
    }
}
