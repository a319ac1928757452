use anyhow::{anyhow, Result};

use shoplytics_core::session::VisitorSession;

use crate::queries::{format_ts, parse_ts};
use crate::DuckDbBackend;

const SELECT_SESSION: &str = "SELECT id, session_token, channel_id, customer_id, \
     CAST(first_seen AS VARCHAR), CAST(last_seen AS VARCHAR) \
     FROM visitor_sessions";

fn row_to_session(row: &duckdb::Row<'_>) -> duckdb::Result<(String, String, String, Option<String>, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn build_session(
    (id, session_token, channel_id, customer_id, first_seen, last_seen): (
        String,
        String,
        String,
        Option<String>,
        String,
        String,
    ),
) -> Result<VisitorSession> {
    Ok(VisitorSession {
        id,
        session_token,
        channel_id,
        customer_id,
        first_seen: parse_ts(&first_seen)?,
        last_seen: parse_ts(&last_seen)?,
    })
}

pub async fn find_session_by_token_inner(
    db: &DuckDbBackend,
    session_token: &str,
) -> Result<Option<VisitorSession>> {
    let conn = db.conn.lock().await;
    let sql = format!("{SELECT_SESSION} WHERE session_token = ?1");
    let mut stmt = conn.prepare(&sql)?;
    match stmt.query_row(duckdb::params![session_token], row_to_session) {
        Ok(raw) => Ok(Some(build_session(raw)?)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert the session and return the stored row.
///
/// Uses `INSERT OR IGNORE` against the unique `session_token` constraint:
/// when two requests race to create the same token, exactly one insert wins
/// and both callers get the winning row back.
pub async fn insert_session_inner(
    db: &DuckDbBackend,
    session: &VisitorSession,
) -> Result<VisitorSession> {
    {
        let conn = db.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO visitor_sessions \
             (id, session_token, channel_id, customer_id, first_seen, last_seen) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            duckdb::params![
                session.id,
                session.session_token,
                session.channel_id,
                session.customer_id,
                format_ts(session.first_seen),
                format_ts(session.last_seen),
            ],
        )?;
    }
    // Re-read through the token: either our row or the one that won the race.
    match find_session_by_token_inner(db, &session.session_token).await? {
        Some(stored) => Ok(stored),
        None => Err(anyhow!(
            "session {} missing immediately after insert",
            session.session_token
        )),
    }
}

pub async fn link_session_customer_inner(
    db: &DuckDbBackend,
    session_id: &str,
    customer_id: &str,
) -> Result<()> {
    let conn = db.conn.lock().await;
    conn.execute(
        "UPDATE visitor_sessions SET customer_id = ?1 WHERE id = ?2",
        duckdb::params![customer_id, session_id],
    )?;
    Ok(())
}

pub async fn touch_session_inner(
    db: &DuckDbBackend,
    session_id: &str,
    last_seen: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    let conn = db.conn.lock().await;
    conn.execute(
        "UPDATE visitor_sessions SET last_seen = ?1 WHERE id = ?2",
        duckdb::params![format_ts(last_seen), session_id],
    )?;
    Ok(())
}
