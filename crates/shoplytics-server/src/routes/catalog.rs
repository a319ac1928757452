use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use shoplytics_catalog::{
    CatalogStore, UpsertChannelParams, UpsertCustomerParams, UpsertProductParams,
};

use crate::{auth, error::AppError, state::AppState};

/// `POST /api/admin/channels` — create or update a channel.
///
/// Replays of platform catalog webhooks hit this repeatedly with the same
/// id; the upsert makes that a no-op beyond refreshing the code.
pub async fn upsert_channel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(params): Json<UpsertChannelParams>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    if params.id.is_empty() {
        return Err(AppError::BadRequest("id is required".to_string()));
    }
    if params.code.is_empty() {
        return Err(AppError::BadRequest("code is required".to_string()));
    }

    let channel = state
        .db
        .upsert_channel(params)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": channel })))
}

/// `DELETE /api/admin/channels/{id}` — remove a channel and every session,
/// event, and rollup row it owns.
pub async fn delete_channel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;

    let deleted = state
        .db
        .delete_channel(&id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    Ok(Json(json!({ "data": { "deleted": true } })))
}

/// `POST /api/admin/products` — create or update a product.
pub async fn upsert_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(params): Json<UpsertProductParams>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    if params.id.is_empty() {
        return Err(AppError::BadRequest("id is required".to_string()));
    }
    if params.name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if params.slug.is_empty() {
        return Err(AppError::BadRequest("slug is required".to_string()));
    }

    let product = state
        .db
        .upsert_product(params)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": product })))
}

/// `DELETE /api/admin/products/{id}` — remove a product. Events keep their
/// rows with the product reference cleared; rollups for the product drop.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;

    let deleted = state
        .db
        .delete_product(&id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(Json(json!({ "data": { "deleted": true } })))
}

/// `POST /api/admin/customers` — create or update a customer.
pub async fn upsert_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(params): Json<UpsertCustomerParams>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;
    if params.id.is_empty() {
        return Err(AppError::BadRequest("id is required".to_string()));
    }

    let customer = state
        .db
        .upsert_customer(params)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": customer })))
}

/// `DELETE /api/admin/customers/{id}` — remove a customer, demoting any
/// session that carried the link back to anonymous.
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth::require_admin(&state, &headers)?;

    let deleted = state
        .db
        .delete_customer(&id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound("Customer not found".to_string()));
    }

    Ok(Json(json!({ "data": { "deleted": true } })))
}
