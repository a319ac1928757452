//! `CatalogStore` implementation for [`DuckDbBackend`].

use anyhow::Result;
use async_trait::async_trait;

use shoplytics_catalog::{
    CatalogStore, ChannelRecord, CustomerRecord, ProductRecord, UpsertChannelParams,
    UpsertCustomerParams, UpsertProductParams,
};

use crate::queries;
use crate::DuckDbBackend;

#[async_trait]
impl CatalogStore for DuckDbBackend {
    async fn channel_exists(&self, channel_id: &str) -> Result<bool> {
        queries::catalog::channel_exists_inner(self, channel_id).await
    }

    async fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        queries::catalog::list_channels_inner(self).await
    }

    async fn upsert_channel(&self, params: UpsertChannelParams) -> Result<ChannelRecord> {
        queries::catalog::upsert_channel_inner(self, params).await
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<bool> {
        queries::catalog::delete_channel_inner(self, channel_id).await
    }

    async fn product_exists(&self, product_id: &str) -> Result<bool> {
        queries::catalog::product_exists_inner(self, product_id).await
    }

    async fn get_products(&self, product_ids: &[String]) -> Result<Vec<ProductRecord>> {
        queries::catalog::get_products_inner(self, product_ids).await
    }

    async fn upsert_product(&self, params: UpsertProductParams) -> Result<ProductRecord> {
        queries::catalog::upsert_product_inner(self, params).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<bool> {
        queries::catalog::delete_product_inner(self, product_id).await
    }

    async fn customer_exists(&self, customer_id: &str) -> Result<bool> {
        queries::catalog::customer_exists_inner(self, customer_id).await
    }

    async fn upsert_customer(&self, params: UpsertCustomerParams) -> Result<CustomerRecord> {
        queries::catalog::upsert_customer_inner(self, params).await
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<bool> {
        queries::catalog::delete_customer_inner(self, customer_id).await
    }
}
