use sqlx::{Executor, PgPool};
use tracing::info;

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    tx.execute(
        r#"
        CREATE SCHEMA IF NOT EXISTS catalog;
        "#,
    )
    .await?;

    tx.execute(
        r#"
        CREATE TABLE IF NOT EXISTS catalog.products (
          id                   UUID PRIMARY KEY,
          brand                TEXT NOT NULL DEFAULT '',
          name                 TEXT NOT NULL DEFAULT '',
          category             TEXT NOT NULL DEFAULT '',
          image_url            TEXT NOT NULL DEFAULT '',
          created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
          updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .await?;

    tx.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_products_created
          ON catalog.products(created_at, id);
        "#,
    )
    .await?;

    tx.execute(
        r#"
        CREATE TABLE IF NOT EXISTS catalog.ingredients (
          id                   UUID PRIMARY KEY,
          product_id           UUID NOT NULL,
          ingredients_list     TEXT NOT NULL DEFAULT '',
          items                JSONB NOT NULL DEFAULT '[]'::jsonb,
          health_score         DOUBLE PRECISION,
          health_level         TEXT,
          health_analysis      TEXT,
          created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
          updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .await?;

    tx.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_ingredients_product
          ON catalog.ingredients(product_id);
        "#,
    )
    .await?;

    tx.commit().await?;
    info!("catalog schema ensured");
    Ok(())
}
