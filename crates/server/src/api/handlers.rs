use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::info;

use crate::api::AppState;
use crate::api::extract::{AdminKey, ValidatedJson};
use crate::api::schemas::{
    LogInteractionRequest, RecommendRequest, RecommendationResponse, RetrainRequest,
    SentimentRequest, SentimentResponse, StatusResponse,
};
use crate::error::{AppError, AppResult};
use crate::metrics::MetricsReport;
use crate::service::RecommendParams;
use data_loader::InteractionEvent;
use pipeline::{MAX_TOP_K, Mood, Recommendation};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.metrics.report())
}

pub async fn sentiment(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SentimentRequest>,
) -> AppResult<Json<SentimentResponse>> {
    if req.text.is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty".to_string()));
    }
    let mood = state.service.analyze_mood(&req.text);
    Ok(Json(SentimentResponse { text: req.text, mood }))
}

pub async fn recommend(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RecommendRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let recommendations = run_recommend(&state, &req, None)?;
    if recommendations.is_empty() {
        return Err(AppError::NotFound(format!(
            "No recommendations found for user {}",
            req.user_id
        )));
    }
    Ok(Json(RecommendationResponse {
        user_id: req.user_id,
        mood: None,
        recommendations,
    }))
}

/// Like [`recommend`], with the mood taken from the explicit label or,
/// failing that, from sentiment analysis of `mood_text`.
pub async fn recommend_with_mood(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RecommendRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let mood = req.mood.or_else(|| {
        req.mood_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| state.service.analyze_mood(text))
    });

    let recommendations = run_recommend(&state, &req, mood)?;
    if recommendations.is_empty() {
        return Err(AppError::NotFound(format!(
            "No mood-based recommendations found for user {}",
            req.user_id
        )));
    }
    Ok(Json(RecommendationResponse {
        user_id: req.user_id,
        mood,
        recommendations,
    }))
}

fn run_recommend(
    state: &AppState,
    req: &RecommendRequest,
    mood: Option<Mood>,
) -> AppResult<Vec<Recommendation>> {
    if !(1..=MAX_TOP_K).contains(&req.top_k) {
        return Err(AppError::BadRequest(format!(
            "top_k must be between 1 and {}",
            MAX_TOP_K
        )));
    }

    let params = RecommendParams {
        user_id: req.user_id.clone(),
        top_k: req.top_k,
        mood,
        city: req.city.clone(),
        tags: req.tags.clone(),
        include_seen: req.include_seen,
        alpha: req.alpha,
        interests_override: req.interests_override.clone(),
    };
    state
        .service
        .recommend(&params)
        .map_err(|e| AppError::internal("Failed to generate recommendations", e))
}

pub async fn log_interaction(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LogInteractionRequest>,
) -> AppResult<Json<StatusResponse>> {
    let mut event = InteractionEvent::new(req.user_id, req.activity_id, req.event);
    event.rating = req.rating;

    state.service.log_interaction(event)?;
    Ok(Json(StatusResponse::ok("Logged")))
}

pub async fn retrain_cf(
    _admin: AdminKey,
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RetrainRequest>,
) -> AppResult<Json<StatusResponse>> {
    state
        .service
        .retrain(req.n_factors)
        .await
        .map_err(|e| AppError::internal("CF retraining failed", e))?;

    let detail = format!("CF retrained with n_factors={}", req.n_factors);
    info!("{}", detail);
    Ok(Json(StatusResponse::ok(detail)))
}
