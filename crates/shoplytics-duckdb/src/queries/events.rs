use anyhow::Result;

use shoplytics_core::event::VisitorEvent;

use crate::queries::format_ts;
use crate::DuckDbBackend;

pub async fn event_exists_inner(
    db: &DuckDbBackend,
    session_id: &str,
    event_key: &str,
) -> Result<bool> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(
        "SELECT COUNT(*) FROM visitor_events WHERE session_id = ?1 AND event_key = ?2",
    )?;
    let count: i64 = stmt.query_row(duckdb::params![session_id, event_key], |row| row.get(0))?;
    Ok(count > 0)
}

/// Insert the event, returning `false` when the unique
/// `(session_id, event_key)` constraint already holds a row.
///
/// `INSERT OR IGNORE` makes the constraint the arbiter: under concurrent
/// duplicate requests exactly one insert reports a row written, so the
/// pre-check in the tracking service never has to be race-free.
pub async fn insert_event_inner(db: &DuckDbBackend, event: &VisitorEvent) -> Result<bool> {
    let conn = db.conn.lock().await;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO visitor_events \
         (id, session_id, channel_id, product_id, event_type, event_key, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        duckdb::params![
            event.id,
            event.session_id,
            event.channel_id,
            event.product_id,
            event.event_type.as_str(),
            event.event_key,
            format_ts(event.created_at),
        ],
    )?;
    Ok(inserted > 0)
}
