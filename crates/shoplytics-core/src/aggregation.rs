//! Batch rollup of raw sessions/events into the daily stat tables.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use shoplytics_catalog::CatalogStore;
use tracing::{debug, info, warn};

use crate::stats::{DailyProductViewStat, DailyVisitorStat, DateRange};
use crate::store::AnalyticsStore;

/// Outcome counters for one aggregated day.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DateAggregation {
    pub date: NaiveDate,
    pub channels_processed: usize,
    pub channels_failed: usize,
}

/// Outcome counters for a backfill run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RangeAggregation {
    pub days: usize,
    pub channels_processed: usize,
    pub channels_failed: usize,
}

/// Recomputes daily rollups from raw rows. Intended to run as a single
/// active instance — concurrent runs over the same (date, channel) race on
/// the upsert. Distinct dates or channels are safe to process in parallel.
#[derive(Clone)]
pub struct AggregationService {
    store: Arc<dyn AnalyticsStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn AnalyticsStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { store, catalog }
    }

    /// Rolls up one calendar day for every channel in the catalog.
    ///
    /// Idempotent: counts are recomputed from raw rows and written with
    /// replace semantics, so re-running a date converges. A failing channel
    /// is logged and skipped; the rest of the run continues.
    pub async fn aggregate_date(&self, date: NaiveDate) -> Result<DateAggregation> {
        let channels = self.catalog.list_channels().await?;

        let mut processed = 0usize;
        let mut failed = 0usize;
        for channel in &channels {
            match self.aggregate_channel_date(&channel.id, date).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        channel_id = %channel.id,
                        date = %date,
                        error = %e,
                        "Skipping channel for this aggregation run"
                    );
                }
            }
        }

        info!(
            date = %date,
            channels_processed = processed,
            channels_failed = failed,
            "Aggregated daily stats"
        );
        Ok(DateAggregation {
            date,
            channels_processed: processed,
            channels_failed: failed,
        })
    }

    /// Re-aggregates every day in the range, ascending, one day at a time.
    /// Days are independent in data but run serially to bound store load.
    pub async fn aggregate_date_range(&self, range: DateRange) -> Result<RangeAggregation> {
        let mut totals = RangeAggregation::default();
        for date in range.days() {
            let day = self.aggregate_date(date).await?;
            totals.days += 1;
            totals.channels_processed += day.channels_processed;
            totals.channels_failed += day.channels_failed;
        }
        info!(
            start = %range.start,
            end = %range.end,
            days = totals.days,
            "Completed backfill aggregation"
        );
        Ok(totals)
    }

    /// Recomputes both stat tables for one (channel, date) unit. The visitor
    /// row is always written, zero counts included; product rows only for
    /// products that had views. Both land in one transaction.
    async fn aggregate_channel_date(&self, channel_id: &str, date: NaiveDate) -> Result<()> {
        let counts = self.store.count_day_visitors(channel_id, date).await?;
        let visitors = DailyVisitorStat {
            stat_date: date,
            channel_id: channel_id.to_string(),
            unique_visitors: counts.unique_visitors,
            authenticated_visitors: counts.authenticated_visitors,
        };

        let products: Vec<DailyProductViewStat> = self
            .store
            .count_day_product_views(channel_id, date)
            .await?
            .into_iter()
            .map(|views| DailyProductViewStat {
                stat_date: date,
                channel_id: channel_id.to_string(),
                product_id: views.product_id,
                views: views.views,
            })
            .collect();

        debug!(
            channel_id,
            date = %date,
            unique_visitors = visitors.unique_visitors,
            products = products.len(),
            "Computed day rollups"
        );
        self.store.upsert_day_rollups(&visitors, &products).await
    }
}
