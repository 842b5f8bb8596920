use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::{NewProduct, ProductPatch, ProductRecord};

#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub brand: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            brand: row.brand,
            name: row.name,
            category: row.category,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, brand, name, category, image_url, created_at, updated_at
        FROM catalog.products
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT id, brand, name, category, image_url, created_at, updated_at
        FROM catalog.products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_product(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO catalog.products (id, brand, name, category, image_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING id, brand, name, category, image_url, created_at, updated_at
        "#,
    )
    .bind(product.id.unwrap_or_else(Uuid::new_v4))
    .bind(&product.brand)
    .bind(&product.name)
    .bind(&product.category)
    .bind(&product.image_url)
    .fetch_one(pool)
    .await
}

pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    patch: &ProductPatch,
) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        UPDATE catalog.products
        SET brand = COALESCE($2, brand),
            name = COALESCE($3, name),
            category = COALESCE($4, category),
            image_url = COALESCE($5, image_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, brand, name, category, image_url, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(patch.brand.as_deref())
    .bind(patch.name.as_deref())
    .bind(patch.category.as_deref())
    .bind(patch.image_url.as_deref())
    .fetch_optional(pool)
    .await
}

pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM catalog.products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .map(|result| result.rows_affected())
}
