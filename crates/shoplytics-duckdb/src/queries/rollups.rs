use anyhow::Result;
use chrono::NaiveDate;

use shoplytics_core::stats::{DailyProductViewStat, DailyVisitorStat, ProductViews, VisitorCounts};

use crate::queries::{day_bounds, format_date};
use crate::DuckDbBackend;

/// Count sessions whose `first_seen` falls inside the day window, attributing
/// each visitor to the day the session was created. `COUNT(customer_id)`
/// skips NULLs, which is exactly the authenticated subset.
pub async fn count_day_visitors_inner(
    db: &DuckDbBackend,
    channel_id: &str,
    date: NaiveDate,
) -> Result<VisitorCounts> {
    let conn = db.conn.lock().await;
    let (day_start, day_end) = day_bounds(date);
    let mut stmt = conn.prepare(
        "SELECT COUNT(*), COUNT(customer_id) \
         FROM visitor_sessions \
         WHERE channel_id = ?1 AND first_seen >= ?2 AND first_seen <= ?3",
    )?;
    let (unique_visitors, authenticated_visitors) = stmt.query_row(
        duckdb::params![channel_id, day_start, day_end],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok(VisitorCounts {
        unique_visitors,
        authenticated_visitors,
    })
}

/// Per-product distinct-session view counts for one channel and day.
///
/// Events whose product reference was NULLed by a catalog deletion are
/// excluded; they no longer belong to any product.
pub async fn count_day_product_views_inner(
    db: &DuckDbBackend,
    channel_id: &str,
    date: NaiveDate,
) -> Result<Vec<ProductViews>> {
    let conn = db.conn.lock().await;
    let (day_start, day_end) = day_bounds(date);
    let mut stmt = conn.prepare(
        "SELECT product_id, COUNT(DISTINCT session_id) \
         FROM visitor_events \
         WHERE channel_id = ?1 \
           AND event_type = 'PRODUCT_VIEW' \
           AND product_id IS NOT NULL \
           AND created_at >= ?2 AND created_at <= ?3 \
         GROUP BY product_id",
    )?;
    let rows = stmt.query_map(duckdb::params![channel_id, day_start, day_end], |row| {
        Ok(ProductViews {
            product_id: row.get(0)?,
            views: row.get(1)?,
        })
    })?;

    let mut views = Vec::new();
    for row in rows {
        views.push(row?);
    }
    Ok(views)
}

/// Write one (channel, date) aggregation unit: the visitor row plus all of
/// its product rows, in a single transaction. Existing counts are replaced
/// via `ON CONFLICT`, so re-running a date converges instead of double
/// counting.
pub async fn upsert_day_rollups_inner(
    db: &DuckDbBackend,
    visitors: &DailyVisitorStat,
    products: &[DailyProductViewStat],
) -> Result<()> {
    let mut conn = db.conn.lock().await;
    let tx = conn.transaction()?;
    let date_str = format_date(visitors.stat_date);

    tx.execute(
        "INSERT INTO daily_visitor_stats \
         (stat_date, channel_id, unique_visitors, authenticated_visitors, updated_at) \
         VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP) \
         ON CONFLICT (stat_date, channel_id) DO UPDATE SET \
             unique_visitors = EXCLUDED.unique_visitors, \
             authenticated_visitors = EXCLUDED.authenticated_visitors, \
             updated_at = CURRENT_TIMESTAMP",
        duckdb::params![
            date_str,
            visitors.channel_id,
            visitors.unique_visitors,
            visitors.authenticated_visitors,
        ],
    )?;

    for product in products {
        tx.execute(
            "INSERT INTO daily_product_view_stats \
             (stat_date, channel_id, product_id, views, updated_at) \
             VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP) \
             ON CONFLICT (stat_date, channel_id, product_id) DO UPDATE SET \
                 views = EXCLUDED.views, \
                 updated_at = CURRENT_TIMESTAMP",
            duckdb::params![date_str, product.channel_id, product.product_id, product.views],
        )?;
    }

    tx.commit()?;
    Ok(())
}
