//! HTTP API.
//!
//! | route                    | handler                        |
//! |--------------------------|--------------------------------|
//! | `GET /health`            | [`handlers::health`]           |
//! | `GET /metrics`           | [`handlers::metrics`]          |
//! | `POST /sentiment`        | [`handlers::sentiment`]        |
//! | `POST /recommend`        | [`handlers::recommend`]        |
//! | `POST /recommend_with_mood` | [`handlers::recommend_with_mood`] |
//! | `POST /log_interaction`  | [`handlers::log_interaction`]  |
//! | `POST /admin/retrain_cf` | [`handlers::retrain_cf`] (needs `x-api-key`) |

pub mod extract;
pub mod handlers;
pub mod schemas;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, http, middleware};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::metrics::{Metrics, track_metrics};
use crate::service::RecommendationService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub metrics: Arc<Metrics>,
    /// `None` disables the admin endpoints
    pub admin_api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(service: Arc<RecommendationService>, admin_api_key: Option<String>) -> Self {
        Self {
            service,
            metrics: Arc::new(Metrics::new()),
            admin_api_key: admin_api_key.map(Arc::from),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/sentiment", post(handlers::sentiment))
        .route("/recommend", post(handlers::recommend))
        .route("/recommend_with_mood", post(handlers::recommend_with_mood))
        .route("/log_interaction", post(handlers::log_interaction))
        .route("/admin/retrain_cf", post(handlers::retrain_cf))
        .layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                tracing::span!(Level::DEBUG, "http", method = %req.method(), uri = %req.uri().path())
            }),
        )
        .with_state(state)
}
