use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::DedupConfig,
    model::{CatalogEntry, IngredientRecord, ProductRecord},
};

use super::scoring::{score, SimilarityResult};

#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub product: ProductRecord,
    pub ingredients: Option<IngredientRecord>,
    pub similarity: SimilarityResult,
}

pub fn index_ingredients(ingredients: &[IngredientRecord]) -> HashMap<Uuid, &IngredientRecord> {
    let mut index = HashMap::with_capacity(ingredients.len());
    for record in ingredients {
        index.entry(record.product_id).or_insert(record);
    }
    index
}

/// Existing products judged duplicates of `query`, best match first.
pub fn find_candidates<Q>(
    query: &Q,
    query_ingredients: Option<&str>,
    corpus: &[ProductRecord],
    ingredients: &[IngredientRecord],
    config: &DedupConfig,
) -> Vec<Candidate>
where
    Q: CatalogEntry + ?Sized,
{
    let ingredient_index = index_ingredients(ingredients);
    let query_id = query.entry_id();

    let mut candidates: Vec<Candidate> = corpus
        .iter()
        .take(config.max_candidates)
        .filter(|existing| Some(existing.id) != query_id)
        .filter_map(|existing| {
            let existing_ingredients = ingredient_index.get(&existing.id).copied();
            let similarity = score(
                query,
                existing,
                query_ingredients,
                existing_ingredients.map(|i| i.ingredients_list.as_str()),
                config,
            );
            similarity.is_duplicate.then(|| Candidate {
                product: existing.clone(),
                ingredients: existing_ingredients.cloned(),
                similarity,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.similarity
            .overall_similarity
            .total_cmp(&a.similarity.overall_similarity)
    });

    tracing::debug!(
        query = query.name(),
        scanned = corpus.len().min(config.max_candidates),
        found = candidates.len(),
        "duplicate candidates collected"
    );

    candidates
}
