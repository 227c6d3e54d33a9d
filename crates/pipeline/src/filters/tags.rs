//! Filter to keep activities tagged with any of the requested tags.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Dataset;
use sources::{Candidate, UserContext};

/// Keeps a candidate if ANY requested tag (trimmed, lowercased) is a
/// substring of the activity's lowercased tag string.
pub struct TagFilter {
    tags: Vec<String>,
}

impl TagFilter {
    pub fn new(tags: Vec<String>) -> Self {
        let tags = tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tags }
    }

    /// Filter for an optional request field; an empty list means no filter.
    pub fn from_request(tags: &[String]) -> Option<Self> {
        let filter = Self::new(tags.to_vec());
        (!filter.tags.is_empty()).then_some(filter)
    }

    fn matches(&self, tags_lower: &str) -> bool {
        self.tags.iter().any(|tag| tags_lower.contains(tag.as_str()))
    }
}

impl Filter for TagFilter {
    fn name(&self) -> &str {
        "TagFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        catalog: &Dataset,
        _context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        let activities = catalog.activities();
        let filtered = candidates
            .into_iter()
            .filter(|candidate| {
                activities
                    .get(candidate.row)
                    .is_some_and(|activity| self.matches(&activity.tags_lower()))
            })
            .collect();
        Ok(filtered)
    }
}
