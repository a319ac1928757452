//! Storage abstraction for raw traffic rows and daily rollups.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::event::VisitorEvent;
use crate::session::VisitorSession;
use crate::stats::{
    DailyProductViewStat, DailyVisitorStat, DateRange, ProductViews, TrendPoint, VisitorCounts,
    VisitorPoint,
};

/// Repository boundary over the analytics tables. Raw tables are written by
/// tracking, rollup tables exclusively by aggregation; every write method is
/// its own transaction.
#[async_trait::async_trait]
pub trait AnalyticsStore: Send + Sync + 'static {
    async fn find_session_by_token(
        &self,
        session_token: &str,
    ) -> Result<Option<VisitorSession>>;

    /// Inserts the session, resolving a lost race on the unique token to the
    /// row that won. Returns the stored row either way.
    async fn insert_session(&self, session: &VisitorSession) -> Result<VisitorSession>;

    async fn link_session_customer(&self, session_id: &str, customer_id: &str) -> Result<()>;

    async fn touch_session(&self, session_id: &str, last_seen: DateTime<Utc>) -> Result<()>;

    async fn event_exists(&self, session_id: &str, event_key: &str) -> Result<bool>;

    /// Returns `false` when the (session_id, event_key) constraint already
    /// holds a row — the caller folds that into the duplicate outcome.
    async fn insert_event(&self, event: &VisitorEvent) -> Result<bool>;

    /// Sessions whose `first_seen` falls inside the date's UTC day window,
    /// split into total and customer-linked counts.
    async fn count_day_visitors(
        &self,
        channel_id: &str,
        date: NaiveDate,
    ) -> Result<VisitorCounts>;

    /// Distinct sessions per product among the day's PRODUCT_VIEW events
    /// with a non-null product reference.
    async fn count_day_product_views(
        &self,
        channel_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ProductViews>>;

    /// Upserts one channel-day's rollups in a single transaction: the
    /// visitor row plus every product row land together or not at all.
    async fn upsert_day_rollups(
        &self,
        visitors: &DailyVisitorStat,
        products: &[DailyProductViewStat],
    ) -> Result<()>;

    /// Rollup rows in range, ascending by date. Days without a row are
    /// absent, not zero-filled.
    async fn visitor_timeseries(
        &self,
        channel_id: &str,
        range: DateRange,
    ) -> Result<Vec<VisitorPoint>>;

    /// Views summed per product across the range, descending, capped at
    /// `limit`.
    async fn top_products(
        &self,
        channel_id: &str,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<ProductViews>>;

    async fn product_trend(
        &self,
        channel_id: &str,
        product_id: &str,
        range: DateRange,
    ) -> Result<Vec<TrendPoint>>;

    /// Sums of the rollup counters across the range; zeroes when no rows.
    async fn sum_visitor_counts(
        &self,
        channel_id: &str,
        range: DateRange,
    ) -> Result<VisitorCounts>;
}
