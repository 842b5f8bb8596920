//! In-memory [`CatalogStore`] used when no database is configured or reachable,
//! and by the test suite.
//!
//! Records live in insertion-ordered `Vec`s behind `std::sync::RwLock`, so
//! listing order is insertion order.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::model::{
    IngredientPatch, IngredientRecord, NewIngredients, NewProduct, ProductPatch, ProductRecord,
};

use super::CatalogStore;

#[derive(Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<ProductRecord>>,
    ingredients: RwLock<Vec<IngredientRecord>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(products: Vec<ProductRecord>, ingredients: Vec<IngredientRecord>) -> Self {
        Self {
            products: RwLock::new(products),
            ingredients: RwLock::new(ingredients),
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory catalog lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory catalog lock poisoned"))
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        Ok(read(&self.products)?.clone())
    }

    async fn list_ingredients(&self) -> Result<Vec<IngredientRecord>> {
        Ok(read(&self.ingredients)?.clone())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<ProductRecord>> {
        Ok(read(&self.products)?.iter().find(|p| p.id == id).cloned())
    }

    async fn ingredients_for(&self, product_id: Uuid) -> Result<Option<IngredientRecord>> {
        Ok(read(&self.ingredients)?
            .iter()
            .find(|i| i.product_id == product_id)
            .cloned())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<ProductRecord> {
        let now = Utc::now();
        let record = ProductRecord {
            id: product.id.unwrap_or_else(Uuid::new_v4),
            brand: product.brand.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut products = write(&self.products)?;
        if products.iter().any(|p| p.id == record.id) {
            return Err(anyhow!("product {} already exists", record.id));
        }
        products.push(record.clone());
        Ok(record)
    }

    async fn insert_ingredients(
        &self,
        product_id: Uuid,
        ingredients: &NewIngredients,
    ) -> Result<IngredientRecord> {
        let now = Utc::now();
        let record = IngredientRecord {
            id: Uuid::new_v4(),
            product_id,
            ingredients_list: ingredients.ingredients_list.clone(),
            items: ingredients.items.clone(),
            health: ingredients.health.clone(),
            created_at: now,
            updated_at: now,
        };
        write(&self.ingredients)?.push(record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRecord>> {
        let mut products = write(&self.products)?;
        Ok(products.iter_mut().find(|p| p.id == id).map(|record| {
            patch.apply(record);
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn update_ingredients(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> Result<Option<IngredientRecord>> {
        let mut ingredients = write(&self.ingredients)?;
        Ok(ingredients.iter_mut().find(|i| i.id == id).map(|record| {
            patch.apply(record);
            record.updated_at = Utc::now();
            record.clone()
        }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<u64> {
        let mut products = write(&self.products)?;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok((before - products.len()) as u64)
    }

    async fn delete_ingredients_by_product(&self, product_id: Uuid) -> Result<u64> {
        let mut ingredients = write(&self.ingredients)?;
        let before = ingredients.len();
        ingredients.retain(|i| i.product_id != product_id);
        Ok((before - ingredients.len()) as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
