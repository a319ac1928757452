use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use shoplytics_core::stats::DateRange;

use crate::{auth, error::AppError, state::AppState};

/// Days added before the end date when the caller omits `start_date`:
/// the default window is the last 30 days ending today (UTC).
const DEFAULT_RANGE_DAYS: i64 = 29;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopProductsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{field} must be YYYY-MM-DD")))
}

/// Resolve optional query dates into an inclusive range.
///
/// A missing `end_date` defaults to today (UTC), a missing `start_date` to
/// 29 days before the end. Malformed dates and inverted ranges are 400s.
fn resolve_range(start_date: Option<&str>, end_date: Option<&str>) -> Result<DateRange, AppError> {
    let today = chrono::Utc::now().date_naive();
    let end = match end_date {
        Some(raw) => parse_date("end_date", raw)?,
        None => today,
    };
    let start = match start_date {
        Some(raw) => parse_date("start_date", raw)?,
        None => end - chrono::Duration::days(DEFAULT_RANGE_DAYS),
    };
    DateRange::new(start, end).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// `GET /api/channels/{channel_id}/analytics/visitors` — daily unique
/// visitors, ascending by date.
///
/// Unknown channels yield an empty series rather than 404; the dashboard
/// renders both the same way.
#[tracing::instrument(skip(state, headers))]
pub async fn visitors(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(channel_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    let range = resolve_range(query.start_date.as_deref(), query.end_date.as_deref())?;

    let series = state
        .query
        .visitor_timeseries(&channel_id, range)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": series })))
}

/// `GET /api/channels/{channel_id}/analytics/top-products` — products by
/// summed views over the range, descending, `limit` capped rows (default 10).
#[tracing::instrument(skip(state, headers))]
pub async fn top_products(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(channel_id): Path<String>,
    Query(query): Query<TopProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    if query.limit.is_some_and(|l| l < 1) {
        return Err(AppError::BadRequest("limit must be >= 1".to_string()));
    }
    let range = resolve_range(query.start_date.as_deref(), query.end_date.as_deref())?;

    let products = state
        .query
        .top_products(&channel_id, range, query.limit)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": products })))
}

/// `GET /api/channels/{channel_id}/analytics/products/{product_id}/trend` —
/// per-day views for one product, ascending by date. Unknown products yield
/// an empty series.
#[tracing::instrument(skip(state, headers))]
pub async fn product_trend(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((channel_id, product_id)): Path<(String, String)>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    let range = resolve_range(query.start_date.as_deref(), query.end_date.as_deref())?;

    let trend = state
        .query
        .product_trend(&channel_id, &product_id, range)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": trend })))
}

/// `GET /api/channels/{channel_id}/analytics/summary` — visitor totals for
/// the range with the authenticated/anonymous split. All zeroes when the
/// channel has no rollups.
#[tracing::instrument(skip(state, headers))]
pub async fn summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(channel_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    let range = resolve_range(query.start_date.as_deref(), query.end_date.as_deref())?;

    let summary = state
        .query
        .visitor_summary(&channel_id, range)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": summary })))
}
