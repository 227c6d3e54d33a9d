//! Request extractors: validated JSON bodies and the admin key guard.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::{Json, async_trait};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use crate::api::AppState;
use crate::error::AppError;

/// Header carrying the shared admin secret
pub const ADMIN_KEY_HEADER: &str = "x-api-key";

/// Normalization applied to a body before its constraints are checked
pub trait Sanitize {
    fn sanitize(&mut self) {}
}

/// JSON body that has been trimmed and validated.
///
/// Malformed JSON and constraint violations are both rejected with 422.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Sanitize,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(json!([{ "msg": rejection.body_text() }])))?;
        value.sanitize();
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Proof that the request carried the configured admin key
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

#[async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_api_key.as_deref() else {
            return Err(AppError::ServiceUnavailable(
                "Admin endpoints not configured on this server.".to_string(),
            ));
        };

        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if provided != expected {
            return Err(AppError::Forbidden("Invalid or missing API Key".to_string()));
        }
        Ok(AdminKey)
    }
}
