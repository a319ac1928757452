use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use shoplytics_core::stats::DateRange;

use crate::{auth, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BackfillRequest {
    pub start_date: String,
    pub end_date: String,
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{field} must be YYYY-MM-DD")))
}

/// `POST /api/aggregate/run` — recompute rollups for one day (default:
/// today UTC). Safe to call repeatedly; counts are replaced, never
/// incremented.
#[tracing::instrument(skip(state, headers))]
pub async fn run(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RunRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;

    let date = match req.date.as_deref() {
        Some(raw) => parse_date("date", raw)?,
        None => chrono::Utc::now().date_naive(),
    };

    let run = state
        .aggregation
        .aggregate_date(date)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": run })))
}

/// `POST /api/aggregate/backfill` — recompute rollups for every day in an
/// inclusive range. Used after importing historical traffic or fixing
/// catalog data.
#[tracing::instrument(skip(state, headers))]
pub async fn backfill(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<BackfillRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;

    let start = parse_date("start_date", &req.start_date)?;
    let end = parse_date("end_date", &req.end_date)?;
    let range = DateRange::new(start, end).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let run = state
        .aggregation
        .aggregate_date_range(range)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": run })))
}
