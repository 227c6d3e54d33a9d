//! Filter to remove activities the user has already interacted with.
//!
//! Applied after the categorical filters, only when the request asks for
//! seen items to be excluded.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Dataset;
use sources::{Candidate, UserContext};

/// Removes candidates present in the user's seen set.
///
/// ## Algorithm
/// Uses the HashSet in UserContext.seen for O(1) lookups.
pub struct AlreadySeenFilter;

impl Filter for AlreadySeenFilter {
    fn name(&self) -> &str {
        "AlreadySeenFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _catalog: &Dataset,
        context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.seen.contains(&candidate.activity_id))
            .collect();
        Ok(filtered)
    }
}
