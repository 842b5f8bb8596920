use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::DedupConfig,
    engine::{
        merge::{merge_records, MergeOutcome},
        policy::{Recommendation, Resolution},
    },
    error::{AppError, AppResult},
    model::{IngredientRecord, NewIngredients, NewProduct, ProductRecord},
    store::CatalogStore,
};

use super::dedup::check_duplication;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Skipped {
        product: ProductRecord,
        resolution: Resolution,
    },
    Merged {
        product: ProductRecord,
        changes: Vec<String>,
        resolution: Resolution,
    },
    Inserted {
        product: ProductRecord,
        ingredients: Option<IngredientRecord>,
        resolution: Resolution,
    },
}

impl IngestOutcome {
    pub fn product(&self) -> &ProductRecord {
        match self {
            IngestOutcome::Skipped { product, .. }
            | IngestOutcome::Merged { product, .. }
            | IngestOutcome::Inserted { product, .. } => product,
        }
    }
}

pub async fn merge_into(
    store: &dyn CatalogStore,
    original_id: Uuid,
    incoming: &NewProduct,
    incoming_ingredients: Option<&NewIngredients>,
) -> AppResult<MergeOutcome> {
    let original = store
        .get_product(original_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {original_id} not found")))?;
    let original_ingredients = store.ingredients_for(original_id).await?;

    let mut outcome = merge_records(
        &original,
        incoming,
        original_ingredients.as_ref(),
        incoming_ingredients,
    );

    if !outcome.product_patch.is_empty() {
        outcome.product = store
            .update_product(original_id, &outcome.product_patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {original_id} not found")))?;
    }

    match (original_ingredients.as_ref(), incoming_ingredients) {
        (Some(existing), _) if !outcome.ingredient_patch.is_empty() => {
            if let Some(updated) = store
                .update_ingredients(existing.id, &outcome.ingredient_patch)
                .await?
            {
                outcome.ingredients = Some(updated);
            }
        }
        (None, Some(incoming)) if !incoming.is_blank() => {
            let added = store.insert_ingredients(original_id, incoming).await?;
            outcome
                .changes
                .push("ingredient list: added".to_string());
            outcome.ingredients = Some(added);
        }
        _ => {}
    }

    if !outcome.is_noop() {
        tracing::info!(
            product_id = %original_id,
            changes = ?outcome.changes,
            "merged entry into existing product"
        );
    }

    Ok(outcome)
}

/// Check a freshly extracted entry against the catalog and act on the
/// recommendation: skip it, merge it into the best match, or insert it.
pub async fn ingest(
    store: &dyn CatalogStore,
    product: NewProduct,
    ingredients: Option<NewIngredients>,
    config: &DedupConfig,
) -> AppResult<IngestOutcome> {
    let product = product.with_placeholders();
    let resolution = check_duplication(store, &product, ingredients.as_ref(), config).await;
    let best = resolution
        .best_match
        .as_ref()
        .map(|candidate| candidate.product.id);

    match (resolution.recommendation, best) {
        (Recommendation::Skip, Some(existing_id)) => {
            let existing = store
                .get_product(existing_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {existing_id} not found")))?;
            tracing::info!(product_id = %existing.id, name = product.name, "entry skipped as duplicate");
            Ok(IngestOutcome::Skipped {
                product: existing,
                resolution,
            })
        }
        (Recommendation::Merge, Some(existing_id)) => {
            let outcome = merge_into(store, existing_id, &product, ingredients.as_ref()).await?;
            if outcome.is_noop() {
                tracing::info!(product_id = %existing_id, "merge found nothing new, entry skipped");
                return Ok(IngestOutcome::Skipped {
                    product: outcome.product,
                    resolution,
                });
            }
            Ok(IngestOutcome::Merged {
                product: outcome.product,
                changes: outcome.changes,
                resolution,
            })
        }
        _ => {
            let stored = store.insert_product(&product).await?;
            let stored_ingredients = match ingredients {
                Some(ingredients) if !ingredients.is_blank() => {
                    Some(store.insert_ingredients(stored.id, &ingredients).await?)
                }
                _ => None,
            };
            tracing::info!(
                product_id = %stored.id,
                brand = stored.brand,
                name = stored.name,
                "entry inserted"
            );
            Ok(IngestOutcome::Inserted {
                product: stored,
                ingredients: stored_ingredients,
                resolution,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{ingredients_for, record};
    use crate::model::{HealthScore, PLACEHOLDER_BRAND, PLACEHOLDER_CATEGORY};
    use crate::service::test_support::FlakyStore;
    use crate::store::MemoryCatalogStore;

    fn entry(brand: &str, name: &str, category: &str) -> NewProduct {
        NewProduct {
            brand: brand.into(),
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    fn list(text: &str) -> NewIngredients {
        NewIngredients {
            ingredients_list: text.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn first_entry_is_inserted_then_repeat_is_skipped() {
        let store = MemoryCatalogStore::new();
        let config = DedupConfig::default();

        let first = ingest(
            &store,
            entry("乐事", "原味薯片", "膨化食品"),
            Some(list("马铃薯、植物油、食盐")),
            &config,
        )
        .await
        .unwrap();
        let IngestOutcome::Inserted { product, ingredients, .. } = first else {
            panic!("expected insert");
        };
        assert_eq!(ingredients.unwrap().product_id, product.id);

        let repeat = ingest(
            &store,
            entry("乐事", "原味 薯片", "薯片"),
            Some(list("马铃薯,植物油,食盐")),
            &config,
        )
        .await
        .unwrap();
        assert!(matches!(repeat, IngestOutcome::Skipped { .. }));
        assert_eq!(repeat.product().id, product.id);
        assert_eq!(store.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn medium_match_merges_into_existing() {
        let existing = record("乐视", "原味薯片", "膨化食品", 0);
        let store = MemoryCatalogStore::seeded(
            vec![existing.clone()],
            vec![ingredients_for(&existing, "马铃薯、植物油、食盐")],
        );

        let outcome = ingest(
            &store,
            entry("乐事", "经典原味薯片", "膨化食品"),
            Some(list("马铃薯、植物油、食盐")),
            &DedupConfig::default(),
        )
        .await
        .unwrap();

        let IngestOutcome::Merged { product, changes, resolution } = outcome else {
            panic!("expected merge");
        };
        assert_eq!(resolution.recommendation, Recommendation::Merge);
        assert_eq!(product.id, existing.id);
        assert_eq!(product.name, "经典原味薯片");
        assert_eq!(changes.len(), 1);
        assert_eq!(
            store.get_product(existing.id).await.unwrap().unwrap().name,
            "经典原味薯片"
        );
        assert_eq!(store.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn merge_without_news_is_skipped() {
        let existing = record("乐视", "原味薯片", "膨化食品", 0);
        let store = MemoryCatalogStore::seeded(
            vec![existing.clone()],
            vec![ingredients_for(&existing, "马铃薯、植物油、食盐")],
        );

        let outcome = ingest(
            &store,
            entry("乐事", "薯片", "膨化食品"),
            Some(list("马铃薯，植物油，食盐")),
            &DedupConfig::default(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, IngestOutcome::Skipped { .. }));
        assert_eq!(store.get_product(existing.id).await.unwrap().unwrap(), existing);
    }

    #[tokio::test]
    async fn unreadable_catalog_still_inserts() {
        let store = FlakyStore::unreadable();
        let outcome = ingest(
            &store,
            entry("", "原味薯片", ""),
            None,
            &DedupConfig::default(),
        )
        .await
        .unwrap();

        let IngestOutcome::Inserted { product, resolution, .. } = outcome else {
            panic!("expected insert");
        };
        assert!(resolution.error.is_some());
        assert_eq!(product.brand, PLACEHOLDER_BRAND);
        assert_eq!(product.category, PLACEHOLDER_CATEGORY);
    }

    #[tokio::test]
    async fn merge_into_persists_patches() {
        let mut existing = record(PLACEHOLDER_BRAND, "薯片", "膨化食品", 0);
        existing.image_url = "https://cdn.example.com/placeholder.png".into();
        let mut stored_ingredients = ingredients_for(&existing, "马铃薯");
        stored_ingredients.health = Some(HealthScore {
            score: 60.0,
            level: Some("fair".into()),
            analysis: None,
        });
        let store = MemoryCatalogStore::seeded(vec![existing.clone()], vec![stored_ingredients]);

        let mut incoming = entry("乐事", "薯片", "膨化食品");
        incoming.image_url = "https://img.example.com/lays.jpg".into();
        let incoming_ingredients = NewIngredients {
            ingredients_list: "马铃薯、植物油、食盐".into(),
            items: Vec::new(),
            health: Some(HealthScore {
                score: 75.0,
                level: Some("good".into()),
                analysis: Some("moderate sodium".into()),
            }),
        };

        let outcome = merge_into(&store, existing.id, &incoming, Some(&incoming_ingredients))
            .await
            .unwrap();
        assert_eq!(outcome.changes.len(), 4);

        let product = store.get_product(existing.id).await.unwrap().unwrap();
        assert_eq!(product.brand, "乐事");
        assert_eq!(product.image_url, "https://img.example.com/lays.jpg");
        let ingredients = store.ingredients_for(existing.id).await.unwrap().unwrap();
        assert_eq!(ingredients.ingredients_list, "马铃薯、植物油、食盐");
        assert_eq!(ingredients.health.unwrap().score, 75.0);
    }

    #[tokio::test]
    async fn merge_into_adds_missing_ingredients() {
        let existing = record("乐事", "原味薯片", "膨化食品", 0);
        let store = MemoryCatalogStore::seeded(vec![existing.clone()], Vec::new());

        let outcome = merge_into(
            &store,
            existing.id,
            &entry("乐事", "原味薯片", "膨化食品"),
            Some(&list("马铃薯、植物油、食盐")),
        )
        .await
        .unwrap();

        assert!(!outcome.is_noop());
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.ingredients.unwrap().product_id, existing.id);
        let stored = store.ingredients_for(existing.id).await.unwrap().unwrap();
        assert_eq!(stored.ingredients_list, "马铃薯、植物油、食盐");

        let again = merge_into(
            &store,
            existing.id,
            &entry("乐事", "原味薯片", "膨化食品"),
            Some(&list("马铃薯、植物油、食盐")),
        )
        .await
        .unwrap();
        assert!(again.is_noop());
        assert_eq!(store.list_ingredients().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn merge_into_ignores_blank_ingredients() {
        let existing = record("乐事", "原味薯片", "膨化食品", 0);
        let store = MemoryCatalogStore::seeded(vec![existing.clone()], Vec::new());

        let outcome = merge_into(
            &store,
            existing.id,
            &entry("乐事", "原味薯片", "膨化食品"),
            Some(&list("  ")),
        )
        .await
        .unwrap();

        assert!(outcome.is_noop());
        assert!(store.ingredients_for(existing.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_into_unknown_product() {
        let store = MemoryCatalogStore::new();
        let result = merge_into(
            &store,
            Uuid::new_v4(),
            &entry("乐事", "薯片", "膨化食品"),
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
