use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A storefront tenant. All analytics rows are partitioned by channel id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub code: String,
    pub created_at: String,
}

/// A catalog product, kept locally for existence checks at tracking time and
/// name/slug resolution on query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A known shopper. Sessions link to customers by id; the link is cleared,
/// not cascaded, when the customer is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertChannelParams {
    pub id: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProductParams {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCustomerParams {
    pub id: String,
    pub email: Option<String>,
}

/// Storage interface for the commerce catalog side-tables.
///
/// The analytics core treats channel/product/customer resolution as a
/// separate boundary: absence of a record is a normal outcome, never an
/// error. A platform-connected deployment could swap this for a client of
/// the shop's own catalog API while keeping the services unchanged.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn channel_exists(&self, channel_id: &str) -> anyhow::Result<bool>;
    async fn list_channels(&self) -> anyhow::Result<Vec<ChannelRecord>>;
    async fn upsert_channel(&self, params: UpsertChannelParams) -> anyhow::Result<ChannelRecord>;
    /// Deletes the channel and, in the same transaction, every session,
    /// event, and rollup row the channel owns.
    async fn delete_channel(&self, channel_id: &str) -> anyhow::Result<bool>;

    async fn product_exists(&self, product_id: &str) -> anyhow::Result<bool>;
    async fn get_products(&self, product_ids: &[String]) -> anyhow::Result<Vec<ProductRecord>>;
    async fn upsert_product(&self, params: UpsertProductParams) -> anyhow::Result<ProductRecord>;
    /// Deletes the product, NULLing event references to it and dropping its
    /// rollup rows in the same transaction.
    async fn delete_product(&self, product_id: &str) -> anyhow::Result<bool>;

    async fn customer_exists(&self, customer_id: &str) -> anyhow::Result<bool>;
    async fn upsert_customer(&self, params: UpsertCustomerParams)
        -> anyhow::Result<CustomerRecord>;
    /// Deletes the customer, clearing the link on any session that carries it.
    async fn delete_customer(&self, customer_id: &str) -> anyhow::Result<bool>;
}
