//! Ordered chain of candidate filters.
//!
//! The ranker builds one pipeline per request from the request's optional
//! city, tags and seen-exclusion settings. Filters only remove candidates,
//! so the surviving order is the catalog order until the final sort.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Dataset;
use sources::{Candidate, UserContext};
use tracing::debug;

/// Filters applied in insertion order.
///
/// ```ignore
/// let survivors = FilterPipeline::new()
///     .add_optional(CityFilter::from_request(request.city.as_deref()))
///     .add_optional(TagFilter::from_request(&request.tags))
///     .add_filter(AlreadySeenFilter)
///     .apply(candidates, &catalog, &context)?;
/// ```
pub struct FilterPipeline {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    /// No-op for `None`, so request fields that are absent add no stage.
    pub fn add_optional(self, filter: Option<impl Filter + 'static>) -> Self {
        match filter {
            Some(filter) => self.add_filter(filter),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over the candidates, short-circuiting on error.
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        catalog: &Dataset,
        context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        self.stages.iter().try_fold(candidates, |current, stage| {
            let before = current.len();
            let kept = stage.apply(current, catalog, context)?;
            debug!("{}: {} -> {} candidates", stage.name(), before, kept.len());
            Ok(kept)
        })
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
