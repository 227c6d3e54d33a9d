//! Filter to keep only activities in the requested city.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Dataset;
use sources::{Candidate, UserContext};

/// Keeps candidates whose city equals the requested one, ignoring case and
/// surrounding whitespace. Activities without a city are dropped.
pub struct CityFilter {
    city: String,
}

impl CityFilter {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into().trim().to_string(),
        }
    }

    /// Filter for an optional request field; blank means no filter.
    pub fn from_request(city: Option<&str>) -> Option<Self> {
        city.map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Self::new)
    }
}

impl Filter for CityFilter {
    fn name(&self) -> &str {
        "CityFilter"
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
                    .is_some_and(|activity| activity.in_city(&self.city))
            })
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Activity;

    #[test]
    fn test_city_filter() {
        let catalog = Dataset::from_activities(
            [("a1", Some("NYC")), ("a2", Some("nyc ")), ("a3", Some("Boston")), ("a4", None)]
                .iter()
                .map(|(id, city)| Activity {
                    id: id.to_string(),
                    title: String::new(),
                    tags: String::new(),
                    city: city.map(str::to_string),
                })
                .collect(),
        )
        .unwrap();

        let candidates = (0..4)
            .map(|row| Candidate::new(row, format!("a{}", row + 1), 0.5))
            .collect();

        let filter = CityFilter::new(" Nyc");
        let filtered = filter
            .apply(candidates, &catalog, &UserContext::new("u1"))
            .unwrap();

        let ids: Vec<_> = filtered.iter().map(|c| c.activity_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[test]
    fn test_blank_city_is_no_filter() {
        assert!(CityFilter::from_request(None).is_none());
        assert!(CityFilter::from_request(Some(" ")).is_none());
        assert!(CityFilter::from_request(Some("NYC")).is_some());
    }
}
