//! Read-side projections over the rollup tables. Never rescans raw events —
//! query cost tracks range length, not traffic volume.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use shoplytics_catalog::CatalogStore;

use crate::stats::{DateRange, TopProduct, TrendPoint, VisitorPoint, VisitorSummary};
use crate::store::AnalyticsStore;

pub const DEFAULT_TOP_PRODUCTS_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn AnalyticsStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn AnalyticsStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { store, catalog }
    }

    /// Daily unique-visitor points, ascending by date. No data yields `[]`,
    /// never an error.
    pub async fn visitor_timeseries(
        &self,
        channel_id: &str,
        range: DateRange,
    ) -> Result<Vec<VisitorPoint>> {
        self.store.visitor_timeseries(channel_id, range).await
    }

    /// Products ranked by views summed across the range, descending.
    /// Name/slug resolution is best-effort: a product deleted since its
    /// views were rolled up keeps its row with null name and slug.
    pub async fn top_products(
        &self,
        channel_id: &str,
        range: DateRange,
        limit: Option<i64>,
    ) -> Result<Vec<TopProduct>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_PRODUCTS_LIMIT).clamp(1, 100);
        let rows = self.store.top_products(channel_id, range, limit).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.product_id.clone()).collect();
        let mut resolved: HashMap<String, (String, String)> = self
            .catalog
            .get_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, (p.name, p.slug)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let (name, slug) = match resolved.remove(&row.product_id) {
                    Some((name, slug)) => (Some(name), Some(slug)),
                    None => (None, None),
                };
                TopProduct {
                    product_id: row.product_id,
                    name,
                    slug,
                    views: row.views,
                }
            })
            .collect())
    }

    /// Daily views for one product, ascending. Unknown product yields `[]`.
    pub async fn product_trend(
        &self,
        channel_id: &str,
        product_id: &str,
        range: DateRange,
    ) -> Result<Vec<TrendPoint>> {
        self.store.product_trend(channel_id, product_id, range).await
    }

    /// Sum of `unique_visitors` across the range; 0 when no rows match.
    pub async fn total_unique_visitors(&self, channel_id: &str, range: DateRange) -> Result<i64> {
        let counts = self.store.sum_visitor_counts(channel_id, range).await?;
        Ok(counts.unique_visitors)
    }

    /// Summary totals with the authenticated/anonymous split.
    pub async fn visitor_summary(
        &self,
        channel_id: &str,
        range: DateRange,
    ) -> Result<VisitorSummary> {
        let counts = self.store.sum_visitor_counts(channel_id, range).await?;
        Ok(VisitorSummary {
            total_unique_visitors: counts.unique_visitors,
            authenticated_visitors: counts.authenticated_visitors,
            anonymous_visitors: counts.unique_visitors - counts.authenticated_visitors,
        })
    }
}
