use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::model::{HealthScore, IngredientItem, IngredientPatch, IngredientRecord, NewIngredients};

#[derive(Debug, sqlx::FromRow)]
pub struct IngredientRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub ingredients_list: String,
    pub items: Json<Vec<IngredientItem>>,
    pub health_score: Option<f64>,
    pub health_level: Option<String>,
    pub health_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<IngredientRow> for IngredientRecord {
    fn from(row: IngredientRow) -> Self {
        // level and analysis only mean something next to a score
        let health = row.health_score.map(|score| HealthScore {
            score,
            level: row.health_level,
            analysis: row.health_analysis,
        });
        Self {
            id: row.id,
            product_id: row.product_id,
            ingredients_list: row.ingredients_list,
            items: row.items.0,
            health,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, product_id, ingredients_list, items, health_score, health_level, \
                       health_analysis, created_at, updated_at";

pub async fn list_ingredients(pool: &PgPool) -> Result<Vec<IngredientRow>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM catalog.ingredients ORDER BY created_at ASC, id ASC");
    sqlx::query_as::<_, IngredientRow>(&sql)
        .fetch_all(pool)
        .await
}

pub async fn ingredients_for(
    pool: &PgPool,
    product_id: Uuid,
) -> Result<Option<IngredientRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM catalog.ingredients WHERE product_id = $1 \
         ORDER BY created_at ASC, id ASC LIMIT 1"
    );
    sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_ingredients(
    pool: &PgPool,
    product_id: Uuid,
    ingredients: &NewIngredients,
) -> Result<IngredientRow, sqlx::Error> {
    let health = ingredients.health.as_ref();
    let sql = format!(
        r#"
        INSERT INTO catalog.ingredients (
            id, product_id, ingredients_list, items,
            health_score, health_level, health_analysis,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(&ingredients.ingredients_list)
        .bind(Json(&ingredients.items))
        .bind(health.map(|h| h.score))
        .bind(health.and_then(|h| h.level.as_deref()))
        .bind(health.and_then(|h| h.analysis.as_deref()))
        .fetch_one(pool)
        .await
}

pub async fn update_ingredients(
    pool: &PgPool,
    id: Uuid,
    patch: &IngredientPatch,
) -> Result<Option<IngredientRow>, sqlx::Error> {
    let health = patch.health.as_ref();
    let sql = format!(
        r#"
        UPDATE catalog.ingredients
        SET ingredients_list = COALESCE($2, ingredients_list),
            items = COALESCE($3, items),
            health_score = CASE WHEN $4 THEN $5 ELSE health_score END,
            health_level = CASE WHEN $4 THEN $6 ELSE health_level END,
            health_analysis = CASE WHEN $4 THEN $7 ELSE health_analysis END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(id)
        .bind(patch.ingredients_list.as_deref())
        .bind(patch.items.as_ref().map(Json))
        .bind(health.is_some())
        .bind(health.map(|h| h.score))
        .bind(health.and_then(|h| h.level.as_deref()))
        .bind(health.and_then(|h| h.analysis.as_deref()))
        .fetch_optional(pool)
        .await
}

pub async fn delete_by_product(pool: &PgPool, product_id: Uuid) -> Result<u64, sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM catalog.ingredients
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .execute(pool)
    .await
    .map(|result| result.rows_affected())
}
