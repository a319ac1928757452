use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use shoplytics_catalog::{CatalogStore, UpsertChannelParams, UpsertProductParams};
use shoplytics_core::config::Config;
use shoplytics_core::stats::{DailyProductViewStat, DailyVisitorStat};
use shoplytics_core::store::AnalyticsStore;
use shoplytics_duckdb::DuckDbBackend;
use shoplytics_server::app::build_app;
use shoplytics_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/shoplytics-test".to_string(),
        admin_token: None,
        aggregate_interval_secs: 1800,
        cors_origins: vec![],
        duckdb_memory_limit: "1GB".to_string(),
    }
}

fn day(s: &str) -> NaiveDate {
    s.parse().expect("valid date literal")
}

async fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.upsert_channel(UpsertChannelParams {
        id: "channel-1".to_string(),
        code: "default".to_string(),
    })
    .await
    .expect("seed channel");
    db.upsert_product(UpsertProductParams {
        id: "product-1".to_string(),
        name: "Aeron Chair".to_string(),
        slug: "aeron-chair".to_string(),
    })
    .await
    .expect("seed product");
    db.upsert_product(UpsertProductParams {
        id: "product-2".to_string(),
        name: "Desk Lamp".to_string(),
        slug: "desk-lamp".to_string(),
    })
    .await
    .expect("seed product");

    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

/// Seed one day's visitor rollup directly, bypassing aggregation.
async fn seed_visitor_day(state: &AppState, date: &str, unique: i64, authenticated: i64) {
    state
        .db
        .upsert_day_rollups(
            &DailyVisitorStat {
                stat_date: day(date),
                channel_id: "channel-1".to_string(),
                unique_visitors: unique,
                authenticated_visitors: authenticated,
            },
            &[],
        )
        .await
        .expect("seed visitor rollup");
}

/// Seed one day's product-view rollups directly.
async fn seed_product_day(state: &AppState, date: &str, rows: &[(&str, i64)]) {
    let products: Vec<DailyProductViewStat> = rows
        .iter()
        .map(|(product_id, views)| DailyProductViewStat {
            stat_date: day(date),
            channel_id: "channel-1".to_string(),
            product_id: product_id.to_string(),
            views: *views,
        })
        .collect();
    state
        .db
        .upsert_day_rollups(
            &DailyVisitorStat {
                stat_date: day(date),
                channel_id: "channel-1".to_string(),
                unique_visitors: 0,
                authenticated_visitors: 0,
            },
            &products,
        )
        .await
        .expect("seed product rollups");
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let body = response.into_body().collect().await.expect("read body");
    serde_json::from_slice(&body.to_bytes()).expect("parse JSON")
}

// ============================================================
// BDD: Visitor timeseries is ascending and skips days without rows
// ============================================================
#[tokio::test]
async fn test_visitors_timeseries_ascending() {
    let (state, app) = setup().await;
    seed_visitor_day(&state, "2024-01-03", 7, 2).await;
    seed_visitor_day(&state, "2024-01-01", 5, 1).await;
    // 2024-01-02 deliberately has no rollup row.

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/visitors?start_date=2024-01-01&end_date=2024-01-04",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["data"],
        json!([
            { "date": "2024-01-01", "unique_visitors": 5 },
            { "date": "2024-01-03", "unique_visitors": 7 }
        ])
    );
}

// ============================================================
// BDD: Range endpoints default to the last 30 days
// ============================================================
#[tokio::test]
async fn test_visitors_default_range_includes_today() {
    let (state, app) = setup().await;
    let today = chrono::Utc::now().date_naive().to_string();
    seed_visitor_day(&state, &today, 3, 0).await;

    let response = app
        .oneshot(get("/api/channels/channel-1/analytics/visitors"))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"][0]["date"], today.as_str());
    assert_eq!(json["data"][0]["unique_visitors"], 3);
}

// ============================================================
// BDD: Top products sum views across days, descending, with
// catalog names resolved
// ============================================================
#[tokio::test]
async fn test_top_products_sums_and_resolves_names() {
    let (state, app) = setup().await;
    seed_product_day(&state, "2024-01-01", &[("product-1", 4), ("product-2", 9)]).await;
    seed_product_day(&state, "2024-01-02", &[("product-1", 3)]).await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/top-products?start_date=2024-01-01&end_date=2024-01-02",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["data"],
        json!([
            { "product_id": "product-2", "name": "Desk Lamp", "slug": "desk-lamp", "views": 9 },
            { "product_id": "product-1", "name": "Aeron Chair", "slug": "aeron-chair", "views": 7 }
        ])
    );
}

// ============================================================
// BDD: Top products respects the limit parameter
// ============================================================
#[tokio::test]
async fn test_top_products_limit() {
    let (state, app) = setup().await;
    seed_product_day(&state, "2024-01-01", &[("product-1", 4), ("product-2", 9)]).await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/top-products?start_date=2024-01-01&end_date=2024-01-01&limit=1",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let rows = json["data"].as_array().expect("data array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["product_id"], "product-2");
}

#[tokio::test]
async fn test_top_products_rejects_non_positive_limit() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/top-products?limit=0",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

// ============================================================
// BDD: Product trend is per-product and ascending
// ============================================================
#[tokio::test]
async fn test_product_trend_scoped_and_ascending() {
    let (state, app) = setup().await;
    seed_product_day(&state, "2024-01-02", &[("product-1", 3), ("product-2", 8)]).await;
    seed_product_day(&state, "2024-01-01", &[("product-1", 4)]).await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/products/product-1/trend?start_date=2024-01-01&end_date=2024-01-02",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["data"],
        json!([
            { "date": "2024-01-01", "views": 4 },
            { "date": "2024-01-02", "views": 3 }
        ])
    );
}

// ============================================================
// BDD: Summary sums the range and splits authenticated/anonymous
// ============================================================
#[tokio::test]
async fn test_summary_totals_and_split() {
    let (state, app) = setup().await;
    seed_visitor_day(&state, "2024-01-01", 10, 3).await;
    seed_visitor_day(&state, "2024-01-02", 5, 2).await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/summary?start_date=2024-01-01&end_date=2024-01-02",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["data"],
        json!({
            "total_unique_visitors": 15,
            "authenticated_visitors": 5,
            "anonymous_visitors": 10
        })
    );
}

// ============================================================
// BDD: Unknown channels degrade to empty results, not 404
// ============================================================
#[tokio::test]
async fn test_unknown_channel_returns_empty_results() {
    let (state, app) = setup().await;
    seed_visitor_day(&state, "2024-01-01", 10, 3).await;

    let visitors = app
        .clone()
        .oneshot(get(
            "/api/channels/channel-unknown/analytics/visitors?start_date=2024-01-01&end_date=2024-01-02",
        ))
        .await
        .expect("visitors request");
    assert_eq!(visitors.status(), StatusCode::OK);
    assert_eq!(json_body(visitors).await["data"], json!([]));

    let summary = app
        .oneshot(get(
            "/api/channels/channel-unknown/analytics/summary?start_date=2024-01-01&end_date=2024-01-02",
        ))
        .await
        .expect("summary request");
    assert_eq!(summary.status(), StatusCode::OK);
    assert_eq!(
        json_body(summary).await["data"],
        json!({
            "total_unique_visitors": 0,
            "authenticated_visitors": 0,
            "anonymous_visitors": 0
        })
    );
}

// ============================================================
// BDD: Malformed and inverted date params are 400s
// ============================================================
#[tokio::test]
async fn test_malformed_date_rejected() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/visitors?start_date=January",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["message"], "start_date must be YYYY-MM-DD");
}

#[tokio::test]
async fn test_inverted_range_rejected() {
    let (_state, app) = setup().await;

    let response = app
        .oneshot(get(
            "/api/channels/channel-1/analytics/visitors?start_date=2024-02-01&end_date=2024-01-01",
        ))
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}
