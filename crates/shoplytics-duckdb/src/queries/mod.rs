//! SQL query implementations backing the store traits.
//!
//! Each public operation lives here as a `*_inner` function taking
//! `&DuckDbBackend`; the trait impls in `store_impl.rs` and
//! `catalog_impl.rs` are thin delegations. Keeping the SQL in one place
//! makes the day-window and date-bucket conventions easy to audit.

pub mod catalog;
pub mod events;
pub mod reads;
pub mod rollups;
pub mod sessions;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Timestamps are stored as formatted strings and read back via
/// `CAST(col AS VARCHAR)`, so the format must round-trip through DuckDB's
/// TIMESTAMP rendering (space separator, fractional seconds).
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .map_err(|e| anyhow!("unparseable timestamp {raw:?} from store: {e}"))?;
    Ok(naive.and_utc())
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow!("unparseable date {raw:?} from store: {e}"))
}

/// Inclusive `[00:00:00, 23:59:59]` bounds for a calendar day, as SQL
/// TIMESTAMP literals. Sub-second events after 23:59:59 fall outside the
/// window by convention.
pub(crate) fn day_bounds(date: NaiveDate) -> (String, String) {
    let day = format_date(date);
    (format!("{day} 00:00:00"), format!("{day} 23:59:59"))
}
