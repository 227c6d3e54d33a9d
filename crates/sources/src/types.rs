//! Per-request types shared by the score sources and the ranking pipeline.

use data_loader::{ActivityId, UserId};
use serde::Serialize;
use std::collections::HashSet;

/// One activity under consideration for a request.
///
/// `row` is the activity's position in catalog order; score vectors are
/// indexed by it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub row: usize,
    pub activity_id: ActivityId,
    /// Blended, normalized score used for ranking
    pub score: f32,
    /// Raw content score after any mood boost
    pub content_score: f32,
    /// Raw latent score; `None` when the user has no latent signal
    pub latent_score: Option<f32>,
}

impl Candidate {
    pub fn new(row: usize, activity_id: impl Into<ActivityId>, score: f32) -> Self {
        Self {
            row,
            activity_id: activity_id.into(),
            score,
            content_score: 0.0,
            latent_score: None,
        }
    }

    pub fn with_components(mut self, content_score: f32, latent_score: Option<f32>) -> Self {
        self.content_score = content_score;
        self.latent_score = latent_score;
        self
    }
}

/// What the pipeline knows about the requesting user.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,
    /// Point-in-time copy of the activities the user has interacted with
    pub seen: HashSet<ActivityId>,
}

impl UserContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            seen: HashSet::new(),
        }
    }

    pub fn with_seen(mut self, seen: HashSet<ActivityId>) -> Self {
        self.seen = seen;
        self
    }
}
