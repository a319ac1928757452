use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Assemble the Axum [`Router`]: every route plus the middleware stack.
///
/// Layers run outer-to-inner on the way in and inner-to-outer on the way
/// out:
///
/// 1. `TraceLayer` — request/response logging through `tracing`.
/// 2. `CorsLayer` — the track endpoint is called from storefront pages on
///    other origins; browsers need CORS headers. Origins come from
///    `SHOPLYTICS_CORS_ORIGINS`, permissive when unset.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/track", post(routes::track::track))
        .route(
            "/api/channels/{channel_id}/analytics/visitors",
            get(routes::analytics::visitors),
        )
        .route(
            "/api/channels/{channel_id}/analytics/top-products",
            get(routes::analytics::top_products),
        )
        .route(
            "/api/channels/{channel_id}/analytics/products/{product_id}/trend",
            get(routes::analytics::product_trend),
        )
        .route(
            "/api/channels/{channel_id}/analytics/summary",
            get(routes::analytics::summary),
        )
        .route("/api/aggregate/run", post(routes::aggregate::run))
        .route("/api/aggregate/backfill", post(routes::aggregate::backfill))
        .route("/api/admin/channels", post(routes::catalog::upsert_channel))
        .route(
            "/api/admin/channels/{id}",
            delete(routes::catalog::delete_channel),
        )
        .route("/api/admin/products", post(routes::catalog::upsert_product))
        .route(
            "/api/admin/products/{id}",
            delete(routes::catalog::delete_product),
        )
        .route(
            "/api/admin/customers",
            post(routes::catalog::upsert_customer),
        )
        .route(
            "/api/admin/customers/{id}",
            delete(routes::catalog::delete_customer),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
