/// The SQL batch that sets up the DuckDB schema.
///
/// Runs through `Connection::execute_batch` each time the database is
/// opened. Every statement carries `IF NOT EXISTS`, so restarts are
/// idempotent.
///
/// `memory_limit` arrives at runtime from `Config.duckdb_memory_limit`
/// (env `SHOPLYTICS_DUCKDB_MEMORY`, default `"1GB"`). An explicit limit is
/// always set — DuckDB's default of 80% of system RAM is not acceptable for
/// a server process. `SET threads = 2` bounds the background thread pool for
/// single-writer embedded use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- CATALOG SIDE-TABLES
-- ===========================================
-- Local copies of the commerce platform's channel/product/customer records.
-- Tracking consults them for existence checks; queries resolve product
-- names from them best-effort.
CREATE TABLE IF NOT EXISTS channels (
    id              VARCHAR PRIMARY KEY,
    code            VARCHAR NOT NULL UNIQUE,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS products (
    id              VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    slug            VARCHAR NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS customers (
    id              VARCHAR PRIMARY KEY,
    email           VARCHAR,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- VISITOR SESSIONS (raw, written by tracking)
-- ===========================================
CREATE TABLE IF NOT EXISTS visitor_sessions (
    id              VARCHAR PRIMARY KEY,            -- UUID v4
    session_token   VARCHAR NOT NULL UNIQUE,        -- client-facing token; creation races resolve on this
    channel_id      VARCHAR NOT NULL,
    customer_id     VARCHAR,                        -- NULL for anonymous traffic
    first_seen      TIMESTAMP NOT NULL,
    last_seen       TIMESTAMP NOT NULL              -- updated on every recorded event
);
-- Aggregation scans sessions by channel + first_seen day window
CREATE INDEX IF NOT EXISTS idx_sessions_channel_first_seen
    ON visitor_sessions(channel_id, first_seen);
-- Customer unlink on delete
CREATE INDEX IF NOT EXISTS idx_sessions_customer
    ON visitor_sessions(customer_id);

-- ===========================================
-- VISITOR EVENTS (raw, written by tracking)
-- ===========================================
CREATE TABLE IF NOT EXISTS visitor_events (
    id              VARCHAR PRIMARY KEY,            -- UUID v4
    session_id      VARCHAR NOT NULL,
    channel_id      VARCHAR NOT NULL,
    product_id      VARCHAR,                        -- NULLed when the product is deleted
    event_type      VARCHAR NOT NULL,               -- 'PRODUCT_VIEW' | 'PAGE_VIEW'
    event_key       VARCHAR NOT NULL,               -- dedup key, e.g. 'product-<id>'
    created_at      TIMESTAMP NOT NULL,
    -- At most one event per (session, dedup key) regardless of request
    -- interleaving; the losing concurrent insert reports as a duplicate.
    UNIQUE (session_id, event_key)
);
-- Aggregation scans events by channel + created_at day window
CREATE INDEX IF NOT EXISTS idx_events_channel_created
    ON visitor_events(channel_id, created_at);
-- Product unlink on delete
CREATE INDEX IF NOT EXISTS idx_events_product
    ON visitor_events(product_id, created_at);
-- Session cascade on channel delete
CREATE INDEX IF NOT EXISTS idx_events_session
    ON visitor_events(session_id, created_at);

-- ===========================================
-- DAILY ROLLUPS (written only by aggregation)
-- ===========================================
-- Counts are replaced, never incremented, so reprocessing a date is
-- idempotent. No other writer touches these tables.
CREATE TABLE IF NOT EXISTS daily_visitor_stats (
    stat_date               DATE NOT NULL,
    channel_id              VARCHAR NOT NULL,
    unique_visitors         BIGINT NOT NULL,
    authenticated_visitors  BIGINT NOT NULL DEFAULT 0,
    updated_at              TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (stat_date, channel_id)
);

CREATE TABLE IF NOT EXISTS daily_product_view_stats (
    stat_date       DATE NOT NULL,
    channel_id      VARCHAR NOT NULL,
    product_id      VARCHAR NOT NULL,
    views           BIGINT NOT NULL,                -- distinct sessions, not raw events
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (stat_date, channel_id, product_id)
);
-- Top-products sums views per product across a date range
CREATE INDEX IF NOT EXISTS idx_product_stats_channel_product
    ON daily_product_view_stats(channel_id, product_id, stat_date);
"#
    )
}
