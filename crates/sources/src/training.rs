//! Latent factor training - truncated SVD of the user-item matrix
//!
//! ## Algorithm
//! 1. Rows = users in first-appearance order, columns = activities in
//!    catalog order. Cell value = summed event weights (rating, else 1)
//! 2. Form the item Gram matrix `G = Rᵀ R`
//! 3. Extract the top-k eigenvectors of `G` by power iteration, deflating
//!    after each component and re-orthogonalizing against earlier ones
//! 4. Item factors = V (n_items × k), user factors = R·V (= U·Σ)
//!
//! The starting vectors come from a fixed seed, so two runs on the same
//! events produce the same factors.

use crate::error::{Result, SourceError};
use crate::latent::LatentFactorStore;
use data_loader::{Dataset, InteractionEvent};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Default latent dimensionality
pub const DEFAULT_N_FACTORS: usize = 50;

/// Accepted `n_factors` range at the API and CLI boundary
pub const MIN_N_FACTORS: usize = 2;
pub const MAX_N_FACTORS: usize = 512;

/// Truncated-SVD trainer
#[derive(Debug, Clone)]
pub struct LatentFactorTrainer {
    n_factors: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
}

impl LatentFactorTrainer {
    pub fn new(n_factors: usize) -> Self {
        Self {
            n_factors,
            max_iterations: 500,
            tolerance: 1e-9,
            seed: 42,
        }
    }

    /// Configure the power-iteration cap per component (default: 500)
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Configure the random seed for starting vectors (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Factorize the interaction log against the catalog.
    #[instrument(skip(self, events, catalog), fields(n_factors = self.n_factors, events = events.len()))]
    pub fn train(&self, events: &[InteractionEvent], catalog: &Dataset) -> Result<LatentFactorStore> {
        if self.n_factors == 0 {
            return Err(SourceError::InvalidFactorCount(self.n_factors));
        }

        let (user_map, matrix) = build_interaction_matrix(events, catalog)?;
        let (n_users, n_items) = matrix.dim();

        let k = effective_rank(self.n_factors, n_users, n_items);
        if k < self.n_factors {
            debug!("Clamped latent dimensionality from {} to {}", self.n_factors, k);
        }

        let item_factors = self.top_right_singular_vectors(&matrix, k);
        let user_factors = matrix.dot(&item_factors);

        let item_map: HashMap<String, usize> = catalog
            .activities()
            .iter()
            .enumerate()
            .map(|(row, activity)| (activity.id.clone(), row))
            .collect();

        info!(
            "Trained latent factors: {} users x {} items, k = {}",
            n_users, n_items, k
        );

        LatentFactorStore::from_parts(
            user_map,
            item_map,
            user_factors.mapv(|v| v as f32),
            item_factors.mapv(|v| v as f32),
        )
    }

    /// Top-k eigenvectors of `RᵀR` as the columns of an (n_items × k) matrix
    fn top_right_singular_vectors(&self, matrix: &Array2<f64>, k: usize) -> Array2<f64> {
        let n_items = matrix.ncols();
        let mut gram = matrix.t().dot(matrix);
        let mut components = Array2::<f64>::zeros((n_items, k));
        let mut rng = StdRng::seed_from_u64(self.seed);

        for c in 0..k {
            let mut v: Array1<f64> = (0..n_items).map(|_| rng.random_range(-1.0f64..1.0)).collect();
            orthogonalize(&mut v, &components, c);
            if !normalize(&mut v) {
                break;
            }

            let mut eigenvalue = 0.0;
            for _ in 0..self.max_iterations {
                let mut next = gram.dot(&v);
                orthogonalize(&mut next, &components, c);
                eigenvalue = next.dot(&v);
                if !normalize(&mut next) {
                    eigenvalue = 0.0;
                    break;
                }
                let delta = (&next - &v).mapv(f64::abs).sum();
                v = next;
                if delta < self.tolerance {
                    break;
                }
            }

            if eigenvalue <= 0.0 {
                // Remaining spectrum is zero; leave the rest of the columns empty
                debug!("Rank exhausted after {} components", c);
                break;
            }

            // Deflate: G -= λ v vᵀ
            let outer = v
                .view()
                .insert_axis(Axis(1))
                .dot(&v.view().insert_axis(Axis(0)));
            gram.scaled_add(-eigenvalue, &outer);
            components.column_mut(c).assign(&v);
        }

        components
    }
}

/// Train latent factors with the default iteration settings.
pub fn train_latent_factors(
    events: &[InteractionEvent],
    catalog: &Dataset,
    n_factors: usize,
) -> Result<LatentFactorStore> {
    LatentFactorTrainer::new(n_factors).train(events, catalog)
}

/// Latent dimensionality actually used: `min(n_factors, min(n_users, n_items) - 1)`,
/// never below 1.
pub fn effective_rank(n_factors: usize, n_users: usize, n_items: usize) -> usize {
    n_factors
        .min(n_users.min(n_items).saturating_sub(1))
        .max(1)
}

/// Dense user-item matrix plus the user -> row map.
///
/// Events for activities outside the catalog are skipped. Repeated
/// (user, activity) pairs add up.
fn build_interaction_matrix(
    events: &[InteractionEvent],
    catalog: &Dataset,
) -> Result<(HashMap<String, usize>, Array2<f64>)> {
    let mut user_map: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<(usize, usize, f64)> = Vec::with_capacity(events.len());
    let mut skipped = 0usize;

    for event in events {
        let Some(item_row) = catalog.activity_position(&event.activity_id) else {
            skipped += 1;
            continue;
        };
        let next_row = user_map.len();
        let user_row = *user_map.entry(event.user_id.clone()).or_insert(next_row);
        cells.push((user_row, item_row, f64::from(event.weight())));
    }

    if skipped > 0 {
        warn!("Skipped {} interactions for unknown activities", skipped);
    }
    if cells.is_empty() || catalog.is_empty() {
        return Err(SourceError::NoInteractions);
    }

    let mut matrix = Array2::<f64>::zeros((user_map.len(), catalog.len()));
    for (user_row, item_row, weight) in cells {
        matrix[[user_row, item_row]] += weight;
    }
    Ok((user_map, matrix))
}

fn orthogonalize(v: &mut Array1<f64>, basis: &Array2<f64>, filled: usize) {
    for j in 0..filled {
        let column = basis.column(j);
        let projection = column.dot(&*v);
        v.scaled_add(-projection, &column);
    }
}

/// Scale to unit length; false if the vector is numerically zero.
fn normalize(v: &mut Array1<f64>) -> bool {
    let norm = v.dot(&*v).sqrt();
    if norm < 1e-12 {
        return false;
    }
    v.mapv_inplace(|x| x / norm);
    true
}
