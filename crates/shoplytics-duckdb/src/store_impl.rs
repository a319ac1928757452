//! `AnalyticsStore` implementation for [`DuckDbBackend`].
//!
//! Thin delegation layer: every method forwards to its `*_inner` function in
//! [`crate::queries`], which holds the actual SQL.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use shoplytics_core::event::VisitorEvent;
use shoplytics_core::session::VisitorSession;
use shoplytics_core::stats::{
    DailyProductViewStat, DailyVisitorStat, DateRange, ProductViews, TrendPoint, VisitorCounts,
    VisitorPoint,
};
use shoplytics_core::store::AnalyticsStore;

use crate::queries;
use crate::DuckDbBackend;

#[async_trait]
impl AnalyticsStore for DuckDbBackend {
    async fn find_session_by_token(&self, session_token: &str) -> Result<Option<VisitorSession>> {
        queries::sessions::find_session_by_token_inner(self, session_token).await
    }

    async fn insert_session(&self, session: &VisitorSession) -> Result<VisitorSession> {
        queries::sessions::insert_session_inner(self, session).await
    }

    async fn link_session_customer(&self, session_id: &str, customer_id: &str) -> Result<()> {
        queries::sessions::link_session_customer_inner(self, session_id, customer_id).await
    }

    async fn touch_session(&self, session_id: &str, last_seen: DateTime<Utc>) -> Result<()> {
        queries::sessions::touch_session_inner(self, session_id, last_seen).await
    }

    async fn event_exists(&self, session_id: &str, event_key: &str) -> Result<bool> {
        queries::events::event_exists_inner(self, session_id, event_key).await
    }

    async fn insert_event(&self, event: &VisitorEvent) -> Result<bool> {
        queries::events::insert_event_inner(self, event).await
    }

    async fn count_day_visitors(&self, channel_id: &str, date: NaiveDate) -> Result<VisitorCounts> {
        queries::rollups::count_day_visitors_inner(self, channel_id, date).await
    }

    async fn count_day_product_views(
        &self,
        channel_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ProductViews>> {
        queries::rollups::count_day_product_views_inner(self, channel_id, date).await
    }

    async fn upsert_day_rollups(
        &self,
        visitors: &DailyVisitorStat,
        products: &[DailyProductViewStat],
    ) -> Result<()> {
        queries::rollups::upsert_day_rollups_inner(self, visitors, products).await
    }

    async fn visitor_timeseries(
        &self,
        channel_id: &str,
        range: DateRange,
    ) -> Result<Vec<VisitorPoint>> {
        queries::reads::visitor_timeseries_inner(self, channel_id, &range).await
    }

    async fn top_products(
        &self,
        channel_id: &str,
        range: DateRange,
        limit: i64,
    ) -> Result<Vec<ProductViews>> {
        queries::reads::top_products_inner(self, channel_id, &range, limit).await
    }

    async fn product_trend(
        &self,
        channel_id: &str,
        product_id: &str,
        range: DateRange,
    ) -> Result<Vec<TrendPoint>> {
        queries::reads::product_trend_inner(self, channel_id, product_id, &range).await
    }

    async fn sum_visitor_counts(&self, channel_id: &str, range: DateRange) -> Result<VisitorCounts> {
        queries::reads::sum_visitor_counts_inner(self, channel_id, &range).await
    }
}
