//! Rollup rows and the read-side projections served from them.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's visitor rollup for a channel — mirrors `daily_visitor_stats`.
/// Exactly one row exists per (stat_date, channel_id); counts are replaced,
/// never incremented, on recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVisitorStat {
    pub stat_date: NaiveDate,
    pub channel_id: String,
    pub unique_visitors: i64,
    /// Subset of `unique_visitors` whose session carries a customer link.
    pub authenticated_visitors: i64,
}

/// One day's view rollup for a (channel, product) pair — mirrors
/// `daily_product_view_stats`. `views` counts distinct sessions, not events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProductViewStat {
    pub stat_date: NaiveDate,
    pub channel_id: String,
    pub product_id: String,
    pub views: i64,
}

/// Inclusive calendar-day range, UTC. Construction rejects inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(anyhow!("end_date must be on or after start_date"));
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Days in ascending order, both endpoints included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Visitor counts for one channel over some window (a single day during
/// aggregation, a full range when summing rollups).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorCounts {
    pub unique_visitors: i64,
    pub authenticated_visitors: i64,
}

/// Distinct-session view count for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductViews {
    pub product_id: String,
    pub views: i64,
}

/// One point of the visitor timeseries, ascending by date in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorPoint {
    pub date: NaiveDate,
    pub unique_visitors: i64,
}

/// One row of the top-products list. `name`/`slug` are best-effort catalog
/// lookups and stay null for products deleted since the views were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProduct {
    pub product_id: String,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub views: i64,
}

/// One point of a per-product daily trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub views: i64,
}

/// Range totals for the dashboard summary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitorSummary {
    pub total_unique_visitors: i64,
    pub authenticated_visitors: i64,
    pub anonymous_visitors: i64,
}
