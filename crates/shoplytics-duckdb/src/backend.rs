use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::schema::init_sql;

/// A DuckDB backend for shoplytics.
///
/// DuckDB allows a single writer at a time, so the connection lives behind
/// an `Arc<Mutex<_>>`: the async runtime serialises every statement while
/// the struct itself stays cheap to clone across Axum handlers and the
/// scheduler task.
///
/// Memory and thread limits are enforced by [`init_sql`] at open time. The
/// memory limit is configurable via `SHOPLYTICS_DUCKDB_MEMORY` (default
/// `"1GB"`).
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open the DuckDB database file at `path`, creating it if absent.
    ///
    /// `memory_limit` takes a DuckDB size string (`"1GB"`, `"512MB"`) and
    /// comes from `Config.duckdb_memory_limit` at the call site. The schema
    /// init SQL runs on the fresh connection, so every table and index
    /// exists by the time this returns.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB open at {} (memory_limit={}, threads=2)",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a throwaway in-memory DuckDB database.
    ///
    /// Intended for tests only — data is discarded when the struct is
    /// dropped. The memory limit is pinned at 1GB; tests never approach it.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `SELECT 1` to confirm the connection still answers.
    ///
    /// Backs the `/health` endpoint. Errors when the database cannot be
    /// reached (file locked, disk full, etc.).
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Take the connection lock for raw SQL access.
    ///
    /// Exists for integration tests that inspect stored rows directly.
    /// Production code should use the store traits instead.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
