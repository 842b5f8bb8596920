use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    model::{
        IngredientPatch, IngredientRecord, NewIngredients, NewProduct, ProductPatch, ProductRecord,
    },
    repo,
};

use super::CatalogStore;

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let rows = repo::products::list_products(&self.pool).await?;
        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn list_ingredients(&self) -> Result<Vec<IngredientRecord>> {
        let rows = repo::ingredients::list_ingredients(&self.pool).await?;
        Ok(rows.into_iter().map(IngredientRecord::from).collect())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<ProductRecord>> {
        Ok(repo::products::get_product(&self.pool, id)
            .await?
            .map(ProductRecord::from))
    }

    async fn ingredients_for(&self, product_id: Uuid) -> Result<Option<IngredientRecord>> {
        Ok(repo::ingredients::ingredients_for(&self.pool, product_id)
            .await?
            .map(IngredientRecord::from))
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<ProductRecord> {
        Ok(repo::products::insert_product(&self.pool, product)
            .await?
            .into())
    }

    async fn insert_ingredients(
        &self,
        product_id: Uuid,
        ingredients: &NewIngredients,
    ) -> Result<IngredientRecord> {
        Ok(
            repo::ingredients::insert_ingredients(&self.pool, product_id, ingredients)
                .await?
                .into(),
        )
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRecord>> {
        Ok(repo::products::update_product(&self.pool, id, patch)
            .await?
            .map(ProductRecord::from))
    }

    async fn update_ingredients(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> Result<Option<IngredientRecord>> {
        Ok(repo::ingredients::update_ingredients(&self.pool, id, patch)
            .await?
            .map(IngredientRecord::from))
    }

    async fn delete_product(&self, id: Uuid) -> Result<u64> {
        Ok(repo::products::delete_product(&self.pool, id).await?)
    }

    async fn delete_ingredients_by_product(&self, product_id: Uuid) -> Result<u64> {
        Ok(repo::ingredients::delete_by_product(&self.pool, product_id).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
