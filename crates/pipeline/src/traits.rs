use anyhow::Result;
use data_loader::Dataset;
use sources::{Candidate, UserContext};

/// One stage of a [`FilterPipeline`](crate::FilterPipeline).
///
/// A stage may drop candidates but must keep the survivors in their input
/// order. `catalog` is the dataset the candidate rows index into.
pub trait Filter: Send + Sync {
    /// Stage name for debug logs
    fn name(&self) -> &str;

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        catalog: &Dataset,
        context: &UserContext,
    ) -> Result<Vec<Candidate>>;
}
