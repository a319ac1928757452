//! Read-side queries over the daily rollup tables.
//!
//! These never touch `visitor_sessions` or `visitor_events`: dashboard reads
//! see whatever the last aggregation pass produced, by design the only
//! freshness contract the API offers.

use anyhow::Result;

use shoplytics_core::stats::{DateRange, ProductViews, TrendPoint, VisitorCounts, VisitorPoint};

use crate::queries::{format_date, parse_date};
use crate::DuckDbBackend;

pub async fn visitor_timeseries_inner(
    db: &DuckDbBackend,
    channel_id: &str,
    range: &DateRange,
) -> Result<Vec<VisitorPoint>> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(
        "SELECT CAST(stat_date AS VARCHAR), unique_visitors \
         FROM daily_visitor_stats \
         WHERE channel_id = ?1 AND stat_date >= ?2 AND stat_date <= ?3 \
         ORDER BY stat_date ASC",
    )?;
    let rows = stmt.query_map(
        duckdb::params![channel_id, format_date(range.start), format_date(range.end)],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    )?;

    let mut points = Vec::new();
    for row in rows {
        let (date, unique_visitors) = row?;
        points.push(VisitorPoint {
            date: parse_date(&date)?,
            unique_visitors,
        });
    }
    Ok(points)
}

pub async fn top_products_inner(
    db: &DuckDbBackend,
    channel_id: &str,
    range: &DateRange,
    limit: i64,
) -> Result<Vec<ProductViews>> {
    let conn = db.conn.lock().await;
    // SUM over BIGINT yields HUGEINT in DuckDB; cast back before row.get.
    let mut stmt = conn.prepare(
        "SELECT product_id, CAST(SUM(views) AS BIGINT) AS total_views \
         FROM daily_product_view_stats \
         WHERE channel_id = ?1 AND stat_date >= ?2 AND stat_date <= ?3 \
         GROUP BY product_id \
         ORDER BY total_views DESC, product_id ASC \
         LIMIT ?4",
    )?;
    let rows = stmt.query_map(
        duckdb::params![
            channel_id,
            format_date(range.start),
            format_date(range.end),
            limit
        ],
        |row| {
            Ok(ProductViews {
                product_id: row.get(0)?,
                views: row.get(1)?,
            })
        },
    )?;

    let mut products = Vec::new();
    for row in rows {
        products.push(row?);
    }
    Ok(products)
}

pub async fn product_trend_inner(
    db: &DuckDbBackend,
    channel_id: &str,
    product_id: &str,
    range: &DateRange,
) -> Result<Vec<TrendPoint>> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(
        "SELECT CAST(stat_date AS VARCHAR), views \
         FROM daily_product_view_stats \
         WHERE channel_id = ?1 AND product_id = ?2 \
           AND stat_date >= ?3 AND stat_date <= ?4 \
         ORDER BY stat_date ASC",
    )?;
    let rows = stmt.query_map(
        duckdb::params![
            channel_id,
            product_id,
            format_date(range.start),
            format_date(range.end)
        ],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    )?;

    let mut points = Vec::new();
    for row in rows {
        let (date, views) = row?;
        points.push(TrendPoint {
            date: parse_date(&date)?,
            views,
        });
    }
    Ok(points)
}

/// Range totals for the summary endpoint. `COALESCE` keeps channels with no
/// rollup rows at zero instead of NULL.
pub async fn sum_visitor_counts_inner(
    db: &DuckDbBackend,
    channel_id: &str,
    range: &DateRange,
) -> Result<VisitorCounts> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(
        "SELECT CAST(COALESCE(SUM(unique_visitors), 0) AS BIGINT), \
                CAST(COALESCE(SUM(authenticated_visitors), 0) AS BIGINT) \
         FROM daily_visitor_stats \
         WHERE channel_id = ?1 AND stat_date >= ?2 AND stat_date <= ?3",
    )?;
    let (unique_visitors, authenticated_visitors) = stmt.query_row(
        duckdb::params![channel_id, format_date(range.start), format_date(range.end)],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok(VisitorCounts {
        unique_visitors,
        authenticated_visitors,
    })
}
