//! Request and response bodies.

use data_loader::EventKind;
use pipeline::{Mood, Recommendation};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::extract::Sanitize;

fn default_top_k() -> usize {
    5
}

fn default_n_factors() -> usize {
    sources::DEFAULT_N_FACTORS
}

fn trim_optional(value: &mut Option<String>) {
    if let Some(text) = value {
        *text = text.trim().to_string();
    }
}

#[allow(clippy::ptr_arg)]
fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.iter().any(|tag| tag.is_empty() || tag.chars().count() > 50) {
        let mut error = ValidationError::new("length");
        error.message = Some("each tag must be between 1 and 50 characters".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SentimentRequest {
    #[validate(length(max = 2000))]
    pub text: String,
}

impl Sanitize for SentimentRequest {
    fn sanitize(&mut self) {
        self.text = self.text.trim().to_string();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentResponse {
    pub text: String,
    pub mood: Mood,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    /// Range-checked by the handler (400, not 422)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[validate(length(max = 2000))]
    pub mood_text: Option<String>,
    /// Explicit label; takes precedence over `mood_text`
    pub mood: Option<Mood>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10), custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    #[serde(default)]
    pub include_seen: bool,
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: Option<f32>,
    #[validate(length(max = 500))]
    pub interests_override: Option<String>,
}

impl Sanitize for RecommendRequest {
    fn sanitize(&mut self) {
        self.user_id = self.user_id.trim().to_string();
        trim_optional(&mut self.mood_text);
        trim_optional(&mut self.city);
        trim_optional(&mut self.interests_override);
        for tag in &mut self.tags {
            *tag = tag.trim().to_string();
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub mood: Option<Mood>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogInteractionRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    #[validate(length(min = 1, max = 64))]
    pub activity_id: String,
    #[serde(default)]
    pub event: EventKind,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
}

impl Sanitize for LogInteractionRequest {
    fn sanitize(&mut self) {
        self.user_id = self.user_id.trim().to_string();
        self.activity_id = self.activity_id.trim().to_string();
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RetrainRequest {
    #[serde(default = "default_n_factors")]
    #[validate(range(min = 2, max = 512))]
    pub n_factors: usize,
}

impl Sanitize for RetrainRequest {}

/// Success body for commands (`{"status": "ok", "detail": ...}`)
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub detail: String,
}

impl StatusResponse {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: "ok",
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommend(json: serde_json::Value) -> RecommendRequest {
        let mut request: RecommendRequest = serde_json::from_value(json).unwrap();
        request.sanitize();
        request
    }

    #[test]
    fn test_recommend_defaults() {
        let request = recommend(serde_json::json!({ "user_id": " u1 " }));
        assert_eq!(request.user_id, "u1");
        assert_eq!(request.top_k, 5);
        assert!(!request.include_seen);
        assert!(request.tags.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_user_id_is_invalid() {
        let request = recommend(serde_json::json!({ "user_id": "   " }));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_tag_constraints() {
        let too_many: Vec<String> = (0..11).map(|i| format!("t{}", i)).collect();
        assert!(recommend(serde_json::json!({ "user_id": "u1", "tags": too_many })).validate().is_err());
        assert!(recommend(serde_json::json!({ "user_id": "u1", "tags": ["  "] })).validate().is_err());
        assert!(recommend(serde_json::json!({ "user_id": "u1", "tags": [" hiking "] })).validate().is_ok());
    }

    #[test]
    fn test_alpha_range() {
        assert!(recommend(serde_json::json!({ "user_id": "u1", "alpha": 1.5 })).validate().is_err());
        assert!(recommend(serde_json::json!({ "user_id": "u1", "alpha": 0.0 })).validate().is_ok());
    }

    #[test]
    fn test_log_interaction_defaults_to_view() {
        let request: LogInteractionRequest =
            serde_json::from_value(serde_json::json!({ "user_id": "u1", "activity_id": "a1" })).unwrap();
        assert_eq!(request.event, EventKind::View);
        assert!(request.rating.is_none());
    }

    #[test]
    fn test_retrain_factor_bounds() {
        let request: RetrainRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(request.n_factors, 50);
        let request: RetrainRequest = serde_json::from_value(serde_json::json!({ "n_factors": 1 })).unwrap();
        assert!(request.validate().is_err());
    }
}
