//! Latent Factor Store - collaborative score source
//!
//! Low-rank user and item factor matrices from one factorization run,
//! plus the ID -> row maps for both sides.
//!
//! ## Cold start
//! An unknown user (or a user row that points past the end of the factor
//! matrix after a partial retrain) is not an error: the scorer returns an
//! all-zero vector flagged as "no latent signal".

use crate::error::{Result, SourceError};
use data_loader::{ActivityId, Dataset, UserId};
use ndarray::{Array2, ArrayView1};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Latent score vector for one request
#[derive(Debug, Clone, PartialEq)]
pub struct LatentScores {
    /// One score per catalog row
    pub scores: Vec<f32>,
    /// False when the scores are the cold-start zero vector
    pub has_signal: bool,
}

impl LatentScores {
    /// The all-zero, no-signal vector
    pub fn none(len: usize) -> Self {
        Self {
            scores: vec![0.0; len],
            has_signal: false,
        }
    }
}

/// User and item factor matrices with their ID maps
#[derive(Debug, Clone)]
pub struct LatentFactorStore {
    user_map: HashMap<UserId, usize>,
    item_map: HashMap<ActivityId, usize>,
    user_factors: Array2<f32>,
    item_factors: Array2<f32>,
}

impl LatentFactorStore {
    /// Assemble a store, checking that both matrices share the latent
    /// dimensionality.
    pub fn from_parts(
        user_map: HashMap<UserId, usize>,
        item_map: HashMap<ActivityId, usize>,
        user_factors: Array2<f32>,
        item_factors: Array2<f32>,
    ) -> Result<Self> {
        if user_factors.ncols() != item_factors.ncols() {
            return Err(SourceError::ShapeMismatch(format!(
                "user factors have {} columns, item factors have {}",
                user_factors.ncols(),
                item_factors.ncols()
            )));
        }
        Ok(Self {
            user_map,
            item_map,
            user_factors,
            item_factors,
        })
    }

    /// Latent dimensionality k
    pub fn dimensions(&self) -> usize {
        self.user_factors.ncols()
    }

    pub fn user_count(&self) -> usize {
        self.user_factors.nrows()
    }

    pub fn item_count(&self) -> usize {
        self.item_factors.nrows()
    }

    pub fn user_map(&self) -> &HashMap<UserId, usize> {
        &self.user_map
    }

    pub fn item_map(&self) -> &HashMap<ActivityId, usize> {
        &self.item_map
    }

    pub fn user_factors(&self) -> &Array2<f32> {
        &self.user_factors
    }

    pub fn item_factors(&self) -> &Array2<f32> {
        &self.item_factors
    }

    fn user_vector(&self, user_id: &str) -> Option<ArrayView1<'_, f32>> {
        let &row = self.user_map.get(user_id)?;
        if row >= self.user_factors.nrows() {
            debug!(user_id, row, "User row out of bounds, treating as cold start");
            return None;
        }
        Some(self.user_factors.row(row))
    }

    fn item_vector(&self, activity_id: &str) -> Option<ArrayView1<'_, f32>> {
        let &row = self.item_map.get(activity_id)?;
        (row < self.item_factors.nrows()).then(|| self.item_factors.row(row))
    }

    /// Dot product of the user's vector with every catalog item's vector.
    ///
    /// Items missing from the item map score 0.
    #[instrument(skip(self, catalog))]
    pub fn latent_scores(&self, user_id: &str, catalog: &Dataset) -> LatentScores {
        let Some(user_vec) = self.user_vector(user_id) else {
            return LatentScores::none(catalog.len());
        };

        let scores = catalog
            .activities()
            .iter()
            .map(|activity| {
                self.item_vector(&activity.id)
                    .map(|item_vec| user_vec.dot(&item_vec))
                    .unwrap_or(0.0)
            })
            .collect();

        LatentScores {
            scores,
            has_signal: true,
        }
    }

    /// Predicted affinity for one (user, activity) pair
    pub fn predict(&self, user_id: &str, activity_id: &str) -> Option<f32> {
        let user_vec = self.user_vector(user_id)?;
        let item_vec = self.item_vector(activity_id)?;
        Some(user_vec.dot(&item_vec))
    }
}

/// Latent scores with an optional store: a missing store means no signal.
pub fn latent_scores(store: Option<&LatentFactorStore>, user_id: &str, catalog: &Dataset) -> LatentScores {
    match store {
        Some(store) => store.latent_scores(user_id, catalog),
        None => LatentScores::none(catalog.len()),
    }
}
