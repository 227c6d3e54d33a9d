//! TF-IDF vectorizer for activity text.
//!
//! ## Algorithm
//! 1. Lowercase, then split into tokens of two or more word characters
//! 2. Emit unigrams and adjacent-token bigrams ("morning hike")
//! 3. Weight raw term counts by smooth idf: `ln((1 + n) / (1 + df)) + 1`
//! 4. L2-normalize every row so cosine similarity is a plain dot product
//!
//! Vocabulary terms are kept in lexicographic order, which makes term indices
//! (and therefore the persisted vectors) reproducible across builds.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse row: parallel arrays of term indices (ascending) and weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Scale to unit length. A zero vector stays zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Dot product by merging the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Fitted TF-IDF model: vocabulary, idf weights and n-gram range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
}

impl TfidfVectorizer {
    /// Fit on a corpus with unigrams and bigrams.
    pub fn fit(documents: &[String]) -> Self {
        Self::fit_with_ngrams(documents, (1, 2))
    }

    pub fn fit_with_ngrams(documents: &[String], ngram_range: (usize, usize)) -> Self {
        // Document frequency of every term
        let per_doc_terms: Vec<BTreeSet<String>> = documents
            .par_iter()
            .map(|doc| terms(doc, ngram_range).into_iter().collect())
            .collect();

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc_terms in &per_doc_terms {
            for term in doc_terms {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term, index as u32);
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
        }

        Self {
            vocabulary,
            idf,
            ngram_range,
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_index(term).map(|i| self.idf[i as usize])
    }

    /// Vectorize one text into a unit-length TF-IDF row.
    ///
    /// Terms outside the vocabulary are dropped; text with no known terms
    /// yields an empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for term in terms(text, self.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector {
            indices: Vec::with_capacity(counts.len()),
            values: Vec::with_capacity(counts.len()),
        };
        for (index, count) in counts {
            vector.indices.push(index);
            vector.values.push(count * self.idf[index as usize]);
        }
        vector.normalize();
        vector
    }

    /// Vectorize a batch of documents in parallel, preserving order.
    pub fn transform_all(&self, documents: &[String]) -> Vec<SparseVector> {
        documents.par_iter().map(|doc| self.transform(doc)).collect()
    }
}

/// Lowercased tokens of two or more word characters
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// All n-grams in `range` over the token stream
fn terms(text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens = tokenize(text);
    let mut out = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n == 1 {
            out.extend(tokens.iter().cloned());
        } else {
            out.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "morning hike hiking outdoor".to_string(),
            "sunset yoga yoga calm".to_string(),
            "city hiking tour".to_string(),
        ]
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("A hike, a run & 5k!"), vec!["hike", "run", "5k"]);
    }

    #[test]
    fn test_bigrams_in_vocabulary() {
        let vectorizer = TfidfVectorizer::fit(&corpus());
        assert!(vectorizer.term_index("morning hike").is_some());
        assert!(vectorizer.term_index("hike morning").is_none());
    }

    #[test]
    fn test_smooth_idf() {
        let vectorizer = TfidfVectorizer::fit(&corpus());
        // "hiking" appears in 2 of 3 documents
        let expected = (4.0f32 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf("hiking").unwrap() - expected).abs() < 1e-6);
        // "yoga" appears in 1 of 3
        let expected = (4.0f32 / 2.0).ln() + 1.0;
        assert!((vectorizer.idf("yoga").unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let docs = corpus();
        let vectorizer = TfidfVectorizer::fit(&docs);
        for row in vectorizer.transform_all(&docs) {
            assert!((row.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unknown_text_is_empty() {
        let vectorizer = TfidfVectorizer::fit(&corpus());
        assert!(vectorizer.transform("skydiving").is_empty());
        assert!(vectorizer.transform("").is_empty());
    }

    #[test]
    fn test_vocabulary_order_is_lexicographic() {
        let vectorizer = TfidfVectorizer::fit(&corpus());
        let calm = vectorizer.term_index("calm").unwrap();
        let yoga = vectorizer.term_index("yoga").unwrap();
        assert!(calm < yoga);
    }

    #[test]
    fn test_sparse_dot() {
        let a = SparseVector {
            indices: vec![0, 2, 5],
            values: vec![1.0, 2.0, 3.0],
        };
        let b = SparseVector {
            indices: vec![2, 3, 5],
            values: vec![4.0, 1.0, 0.5],
        };
        assert_eq!(a.dot(&b), 2.0 * 4.0 + 3.0 * 0.5);
    }
}
