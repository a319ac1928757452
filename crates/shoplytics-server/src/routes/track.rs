use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use shoplytics_core::event::TrackRequest;

use crate::{error::AppError, state::AppState};

/// `POST /api/track` — record one product view from a storefront page.
///
/// ## Authentication
/// None required; the storefront calls this anonymously.
///
/// ## Outcome
/// Always `200` with `{ "data": { "recorded": bool, "reason"?: ... } }`.
/// A duplicate view, an unknown product, or an unknown channel is a refusal
/// carried in the body, not an HTTP error; only storage failures surface
/// as `500`.
#[tracing::instrument(skip(state, req))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TrackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.channel_id.is_empty() {
        return Err(AppError::BadRequest("channel_id is required".to_string()));
    }
    if req.product_id.is_empty() {
        return Err(AppError::BadRequest("product_id is required".to_string()));
    }

    let outcome = state
        .tracking
        .track_view(&req)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": outcome })))
}
