//! Catalog persistence behind a single trait.
//!
//! The engine reads whole-corpus snapshots and writes patches and deletions
//! through [`CatalogStore`]; which backend sits behind it is decided once, in
//! [`connect`].

mod memory;
mod postgres;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{
    config::DbConfig,
    model::{
        IngredientPatch, IngredientRecord, NewIngredients, NewProduct, ProductPatch, ProductRecord,
    },
    repo,
};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Persistence seam for products and their ingredient records. Listings are
/// oldest first.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<ProductRecord>>;

    async fn list_ingredients(&self) -> Result<Vec<IngredientRecord>>;

    async fn get_product(&self, id: Uuid) -> Result<Option<ProductRecord>>;

    async fn ingredients_for(&self, product_id: Uuid) -> Result<Option<IngredientRecord>>;

    async fn insert_product(&self, product: &NewProduct) -> Result<ProductRecord>;

    async fn insert_ingredients(
        &self,
        product_id: Uuid,
        ingredients: &NewIngredients,
    ) -> Result<IngredientRecord>;

    async fn update_product(&self, id: Uuid, patch: &ProductPatch)
        -> Result<Option<ProductRecord>>;

    async fn update_ingredients(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> Result<Option<IngredientRecord>>;

    async fn delete_product(&self, id: Uuid) -> Result<u64>;

    async fn delete_ingredients_by_product(&self, product_id: Uuid) -> Result<u64>;

    fn backend(&self) -> &'static str;
}

/// Open the configured backend. An empty url selects the in-memory store, and an
/// unreachable database falls back to it as well.
pub async fn connect(config: &DbConfig) -> Result<Arc<dyn CatalogStore>> {
    if config.url.trim().is_empty() {
        tracing::info!("no database url configured, using in-memory catalog");
        return Ok(Arc::new(MemoryCatalogStore::new()));
    }

    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::warn!(error = %err, "database unreachable, falling back to in-memory catalog");
            return Ok(Arc::new(MemoryCatalogStore::new()));
        }
    };

    repo::migrations::ensure_schema(&pool).await?;
    tracing::info!(max_connections = config.max_connections, "connected to postgres catalog");
    Ok(Arc::new(PgCatalogStore::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_selects_memory() {
        let store = connect(&DbConfig::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }
}
