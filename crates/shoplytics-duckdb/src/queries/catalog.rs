//! Catalog side-table queries: channels, products, customers.
//!
//! Upserts are keyed on the platform's own ids so a sync from the shop can
//! replay records freely. Deletes clean up analytics rows in the same
//! transaction; which rows go and which are only unlinked differs per entity.

use anyhow::Result;

use shoplytics_catalog::{
    ChannelRecord, CustomerRecord, ProductRecord, UpsertChannelParams, UpsertCustomerParams,
    UpsertProductParams,
};

use crate::DuckDbBackend;

async fn exists_by_id(db: &DuckDbBackend, table: &str, id: &str) -> Result<bool> {
    let conn = db.conn.lock().await;
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let count: i64 = stmt.query_row(duckdb::params![id], |row| row.get(0))?;
    Ok(count > 0)
}

pub async fn channel_exists_inner(db: &DuckDbBackend, channel_id: &str) -> Result<bool> {
    exists_by_id(db, "channels", channel_id).await
}

pub async fn list_channels_inner(db: &DuckDbBackend) -> Result<Vec<ChannelRecord>> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(
        "SELECT id, code, CAST(created_at AS VARCHAR) FROM channels ORDER BY code ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ChannelRecord {
            id: row.get(0)?,
            code: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;

    let mut channels = Vec::new();
    for row in rows {
        channels.push(row?);
    }
    Ok(channels)
}

pub async fn upsert_channel_inner(
    db: &DuckDbBackend,
    params: UpsertChannelParams,
) -> Result<ChannelRecord> {
    let conn = db.conn.lock().await;
    conn.execute(
        "INSERT INTO channels (id, code) VALUES (?1, ?2) \
         ON CONFLICT (id) DO UPDATE SET code = EXCLUDED.code",
        duckdb::params![params.id, params.code],
    )?;
    // Re-read so created_at reflects the stored row, not this call.
    let mut stmt =
        conn.prepare("SELECT id, code, CAST(created_at AS VARCHAR) FROM channels WHERE id = ?1")?;
    let channel = stmt.query_row(duckdb::params![params.id], |row| {
        Ok(ChannelRecord {
            id: row.get(0)?,
            code: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;
    Ok(channel)
}

/// Remove a channel and everything recorded under it. Sessions, events, and
/// both rollup tables are purged in one transaction so a half-deleted channel
/// can never be observed.
pub async fn delete_channel_inner(db: &DuckDbBackend, channel_id: &str) -> Result<bool> {
    let mut conn = db.conn.lock().await;
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM visitor_events WHERE channel_id = ?1",
        duckdb::params![channel_id],
    )?;
    tx.execute(
        "DELETE FROM visitor_sessions WHERE channel_id = ?1",
        duckdb::params![channel_id],
    )?;
    tx.execute(
        "DELETE FROM daily_visitor_stats WHERE channel_id = ?1",
        duckdb::params![channel_id],
    )?;
    tx.execute(
        "DELETE FROM daily_product_view_stats WHERE channel_id = ?1",
        duckdb::params![channel_id],
    )?;
    let deleted = tx.execute(
        "DELETE FROM channels WHERE id = ?1",
        duckdb::params![channel_id],
    )?;
    tx.commit()?;
    Ok(deleted > 0)
}

pub async fn product_exists_inner(db: &DuckDbBackend, product_id: &str) -> Result<bool> {
    exists_by_id(db, "products", product_id).await
}

/// Batch fetch for name/slug resolution on query results. Ids not present in
/// the catalog are simply absent from the result.
pub async fn get_products_inner(
    db: &DuckDbBackend,
    product_ids: &[String],
) -> Result<Vec<ProductRecord>> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }

    let conn = db.conn.lock().await;
    let placeholders = (1..=product_ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT id, name, slug FROM products WHERE id IN ({placeholders})");

    let params: Vec<Box<dyn duckdb::types::ToSql>> = product_ids
        .iter()
        .map(|id| Box::new(id.clone()) as Box<dyn duckdb::types::ToSql>)
        .collect();
    let param_refs: Vec<&dyn duckdb::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok(ProductRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
        })
    })?;

    let mut products = Vec::new();
    for row in rows {
        products.push(row?);
    }
    Ok(products)
}

pub async fn upsert_product_inner(
    db: &DuckDbBackend,
    params: UpsertProductParams,
) -> Result<ProductRecord> {
    let conn = db.conn.lock().await;
    conn.execute(
        "INSERT INTO products (id, name, slug) VALUES (?1, ?2, ?3) \
         ON CONFLICT (id) DO UPDATE SET \
             name = EXCLUDED.name, \
             slug = EXCLUDED.slug, \
             updated_at = CURRENT_TIMESTAMP",
        duckdb::params![params.id, params.name, params.slug],
    )?;
    Ok(ProductRecord {
        id: params.id,
        name: params.name,
        slug: params.slug,
    })
}

/// Remove a product. Raw events keep their session attribution but lose the
/// product reference; rollup rows for the product are dropped outright.
pub async fn delete_product_inner(db: &DuckDbBackend, product_id: &str) -> Result<bool> {
    let mut conn = db.conn.lock().await;
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE visitor_events SET product_id = NULL WHERE product_id = ?1",
        duckdb::params![product_id],
    )?;
    tx.execute(
        "DELETE FROM daily_product_view_stats WHERE product_id = ?1",
        duckdb::params![product_id],
    )?;
    let deleted = tx.execute(
        "DELETE FROM products WHERE id = ?1",
        duckdb::params![product_id],
    )?;
    tx.commit()?;
    Ok(deleted > 0)
}

pub async fn customer_exists_inner(db: &DuckDbBackend, customer_id: &str) -> Result<bool> {
    exists_by_id(db, "customers", customer_id).await
}

pub async fn upsert_customer_inner(
    db: &DuckDbBackend,
    params: UpsertCustomerParams,
) -> Result<CustomerRecord> {
    let conn = db.conn.lock().await;
    conn.execute(
        "INSERT INTO customers (id, email) VALUES (?1, ?2) \
         ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email",
        duckdb::params![params.id, params.email],
    )?;
    Ok(CustomerRecord {
        id: params.id,
        email: params.email,
    })
}

/// Remove a customer, demoting their sessions to anonymous. Historical
/// rollups are untouched; authenticated counts describe the day they were
/// computed for.
pub async fn delete_customer_inner(db: &DuckDbBackend, customer_id: &str) -> Result<bool> {
    let mut conn = db.conn.lock().await;
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE visitor_sessions SET customer_id = NULL WHERE customer_id = ?1",
        duckdb::params![customer_id],
    )?;
    let deleted = tx.execute(
        "DELETE FROM customers WHERE id = ?1",
        duckdb::params![customer_id],
    )?;
    tx.commit()?;
    Ok(deleted > 0)
}
