use std::sync::Arc;

use shoplytics_catalog::{
    CatalogStore, UpsertChannelParams, UpsertCustomerParams, UpsertProductParams,
};
use shoplytics_core::event::{TrackRefusal, TrackRequest};
use shoplytics_core::store::AnalyticsStore;
use shoplytics_core::tracking::TrackingService;
use shoplytics_duckdb::DuckDbBackend;

async fn seeded_backend() -> Arc<DuckDbBackend> {
    let db = Arc::new(DuckDbBackend::open_in_memory().expect("db"));
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
    .expect("seed product 1");
    db.upsert_product(UpsertProductParams {
        id: "product-2".to_string(),
        name: "Desk Lamp".to_string(),
        slug: "desk-lamp".to_string(),
    })
    .await
    .expect("seed product 2");
    db.upsert_customer(UpsertCustomerParams {
        id: "customer-1".to_string(),
        email: Some("shopper@example.com".to_string()),
    })
    .await
    .expect("seed customer");
    db
}

fn tracker(db: &Arc<DuckDbBackend>) -> TrackingService {
    TrackingService::new(db.clone(), db.clone())
}

fn view(product_id: &str, session_token: Option<&str>) -> TrackRequest {
    TrackRequest {
        channel_id: "channel-1".to_string(),
        product_id: product_id.to_string(),
        session_token: session_token.map(str::to_string),
        customer_id: None,
    }
}

async fn event_count(db: &DuckDbBackend) -> i64 {
    let conn = db.conn_for_test().await;
    let mut stmt = conn
        .prepare("SELECT COUNT(*) FROM visitor_events")
        .expect("prepare");
    stmt.query_row([], |row| row.get(0)).expect("count")
}

#[tokio::test]
async fn test_first_view_recorded_second_refused_as_duplicate() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let first = tracker
        .track_view(&view("product-1", Some("tok-1")))
        .await
        .expect("track");
    assert!(first.recorded);
    assert_eq!(first.reason, None);

    let second = tracker
        .track_view(&view("product-1", Some("tok-1")))
        .await
        .expect("track");
    assert!(!second.recorded);
    assert_eq!(second.reason, Some(TrackRefusal::Duplicate));

    assert_eq!(event_count(&db).await, 1);
}

#[tokio::test]
async fn test_same_product_in_different_sessions_recorded_twice() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let a = tracker
        .track_view(&view("product-1", Some("tok-a")))
        .await
        .expect("track");
    let b = tracker
        .track_view(&view("product-1", Some("tok-b")))
        .await
        .expect("track");
    assert!(a.recorded);
    assert!(b.recorded);
    assert_eq!(event_count(&db).await, 2);
}

#[tokio::test]
async fn test_different_products_in_one_session_recorded() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    assert!(
        tracker
            .track_view(&view("product-1", Some("tok-1")))
            .await
            .expect("track")
            .recorded
    );
    assert!(
        tracker
            .track_view(&view("product-2", Some("tok-1")))
            .await
            .expect("track")
            .recorded
    );
    assert_eq!(event_count(&db).await, 2);
}

#[tokio::test]
async fn test_missing_token_synthesizes_anonymous_session() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let outcome = tracker
        .track_view(&view("product-1", None))
        .await
        .expect("track");
    assert!(outcome.recorded);

    let conn = db.conn_for_test().await;
    let mut stmt = conn
        .prepare("SELECT session_token FROM visitor_sessions")
        .expect("prepare");
    let token: String = stmt.query_row([], |row| row.get(0)).expect("token");
    assert!(token.starts_with("anonymous-"), "got token {token}");
}

#[tokio::test]
async fn test_empty_token_treated_as_missing() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let outcome = tracker
        .track_view(&view("product-1", Some("")))
        .await
        .expect("track");
    assert!(outcome.recorded);

    let conn = db.conn_for_test().await;
    let mut stmt = conn
        .prepare("SELECT session_token FROM visitor_sessions")
        .expect("prepare");
    let token: String = stmt.query_row([], |row| row.get(0)).expect("token");
    assert!(token.starts_with("anonymous-"));
}

#[tokio::test]
async fn test_unknown_product_refused_but_session_still_created() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let outcome = tracker
        .track_view(&view("ghost-product", Some("tok-1")))
        .await
        .expect("track");
    assert!(!outcome.recorded);
    assert_eq!(outcome.reason, Some(TrackRefusal::ProductNotFound));

    // The session write happens before the catalog checks and is kept.
    let session = db
        .find_session_by_token("tok-1")
        .await
        .expect("lookup")
        .expect("session exists");
    assert_eq!(session.channel_id, "channel-1");
    assert_eq!(event_count(&db).await, 0);
}

#[tokio::test]
async fn test_unknown_channel_refused() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let req = TrackRequest {
        channel_id: "ghost-channel".to_string(),
        product_id: "product-1".to_string(),
        session_token: Some("tok-1".to_string()),
        customer_id: None,
    };
    let outcome = tracker.track_view(&req).await.expect("track");
    assert!(!outcome.recorded);
    assert_eq!(outcome.reason, Some(TrackRefusal::ChannelNotFound));
    assert_eq!(event_count(&db).await, 0);
}

#[tokio::test]
async fn test_known_customer_linked_to_new_session() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let req = TrackRequest {
        channel_id: "channel-1".to_string(),
        product_id: "product-1".to_string(),
        session_token: Some("tok-1".to_string()),
        customer_id: Some("customer-1".to_string()),
    };
    assert!(tracker.track_view(&req).await.expect("track").recorded);

    let session = db
        .find_session_by_token("tok-1")
        .await
        .expect("lookup")
        .expect("session");
    assert_eq!(session.customer_id.as_deref(), Some("customer-1"));
}

#[tokio::test]
async fn test_unknown_customer_id_silently_ignored() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    let req = TrackRequest {
        channel_id: "channel-1".to_string(),
        product_id: "product-1".to_string(),
        session_token: Some("tok-1".to_string()),
        customer_id: Some("nobody".to_string()),
    };
    assert!(tracker.track_view(&req).await.expect("track").recorded);

    let session = db
        .find_session_by_token("tok-1")
        .await
        .expect("lookup")
        .expect("session");
    assert_eq!(session.customer_id, None);
}

#[tokio::test]
async fn test_anonymous_session_gains_customer_on_later_request() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    assert!(
        tracker
            .track_view(&view("product-1", Some("tok-1")))
            .await
            .expect("track")
            .recorded
    );

    // Shopper logs in mid-session; the next view carries the customer id.
    let req = TrackRequest {
        channel_id: "channel-1".to_string(),
        product_id: "product-2".to_string(),
        session_token: Some("tok-1".to_string()),
        customer_id: Some("customer-1".to_string()),
    };
    assert!(tracker.track_view(&req).await.expect("track").recorded);

    let session = db
        .find_session_by_token("tok-1")
        .await
        .expect("lookup")
        .expect("session");
    assert_eq!(session.customer_id.as_deref(), Some("customer-1"));
}

#[tokio::test]
async fn test_recorded_view_touches_last_seen() {
    let db = seeded_backend().await;
    let tracker = tracker(&db);

    assert!(
        tracker
            .track_view(&view("product-1", Some("tok-1")))
            .await
            .expect("track")
            .recorded
    );
    let first = db
        .find_session_by_token("tok-1")
        .await
        .expect("lookup")
        .expect("session");

    assert!(
        tracker
            .track_view(&view("product-2", Some("tok-1")))
            .await
            .expect("track")
            .recorded
    );
    let second = db
        .find_session_by_token("tok-1")
        .await
        .expect("lookup")
        .expect("session");

    assert_eq!(first.first_seen, second.first_seen);
    assert!(second.last_seen >= first.last_seen);
}

#[tokio::test]
async fn test_insert_event_conflict_reports_duplicate_not_error() {
    let db = seeded_backend().await;
    let now = chrono::Utc::now();
    let session = shoplytics_core::session::VisitorSession::new(
        "tok-race".to_string(),
        "channel-1".to_string(),
        None,
        now,
    );
    let stored = db.insert_session(&session).await.expect("insert session");

    let event = shoplytics_core::event::VisitorEvent::product_view(
        stored.id.clone(),
        "channel-1".to_string(),
        "product-1".to_string(),
        now,
    );
    assert!(db.insert_event(&event).await.expect("first insert"));

    // Same (session, key) from a racing request: constraint wins, no error.
    let racing = shoplytics_core::event::VisitorEvent::product_view(
        stored.id.clone(),
        "channel-1".to_string(),
        "product-1".to_string(),
        now,
    );
    assert!(!db.insert_event(&racing).await.expect("second insert"));
    assert_eq!(event_count(&db).await, 1);
}

#[tokio::test]
async fn test_insert_session_resolves_token_race_to_stored_row() {
    let db = seeded_backend().await;
    let now = chrono::Utc::now();

    let first = shoplytics_core::session::VisitorSession::new(
        "tok-1".to_string(),
        "channel-1".to_string(),
        None,
        now,
    );
    let stored_first = db.insert_session(&first).await.expect("insert");

    // A second insert with the same token must hand back the winner's row.
    let second = shoplytics_core::session::VisitorSession::new(
        "tok-1".to_string(),
        "channel-1".to_string(),
        None,
        now,
    );
    let stored_second = db.insert_session(&second).await.expect("insert");

    assert_eq!(stored_first.id, stored_second.id);
}
