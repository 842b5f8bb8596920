use std::collections::HashSet;

use serde::Serialize;

use crate::{
    model::{
        is_placeholder_brand, is_placeholder_image, CatalogEntry, IngredientEntry,
        IngredientPatch, IngredientRecord, ProductPatch, ProductRecord,
    },
    util::category::{normalize_category, CATEGORY_OTHER},
};

#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub product: ProductRecord,
    pub ingredients: Option<IngredientRecord>,
    pub product_patch: ProductPatch,
    pub ingredient_patch: IngredientPatch,
    pub changes: Vec<String>,
}

impl MergeOutcome {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Reconcile `incoming` into `original`, keeping whichever side is more complete
/// for each field. `original` is never mutated.
pub fn merge_records<P, I>(
    original: &ProductRecord,
    incoming: &P,
    original_ingredients: Option<&IngredientRecord>,
    incoming_ingredients: Option<&I>,
) -> MergeOutcome
where
    P: CatalogEntry + ?Sized,
    I: IngredientEntry + ?Sized,
{
    let mut changes = Vec::new();
    let mut product_patch = ProductPatch::default();

    if is_placeholder_brand(&original.brand) && !is_placeholder_brand(incoming.brand()) {
        changes.push(format!("brand: {} -> {}", original.brand, incoming.brand()));
        product_patch.brand = Some(incoming.brand().to_string());
    }

    if incoming.name().chars().count() > original.name.chars().count() {
        changes.push(format!("name: {} -> {}", original.name, incoming.name()));
        product_patch.name = Some(incoming.name().to_string());
    }

    if normalize_category(&original.category) == CATEGORY_OTHER
        && normalize_category(incoming.category()) != CATEGORY_OTHER
    {
        changes.push(format!(
            "category: {} -> {}",
            original.category,
            incoming.category()
        ));
        product_patch.category = Some(incoming.category().to_string());
    }

    if is_placeholder_image(&original.image_url) && !is_placeholder_image(incoming.image_url()) {
        changes.push("image: replaced placeholder".to_string());
        product_patch.image_url = Some(incoming.image_url().to_string());
    }

    let ingredient_patch = match (original_ingredients, incoming_ingredients) {
        (Some(ours), Some(theirs)) => merge_ingredients(ours, theirs, &mut changes),
        _ => IngredientPatch::default(),
    };

    let mut product = original.clone();
    product_patch.apply(&mut product);
    let ingredients = original_ingredients.cloned().map(|mut record| {
        ingredient_patch.apply(&mut record);
        record
    });

    tracing::info!(
        product_id = %original.id,
        changes = changes.len(),
        "merge resolved"
    );

    MergeOutcome {
        product,
        ingredients,
        product_patch,
        ingredient_patch,
        changes,
    }
}

fn merge_ingredients<I>(
    ours: &IngredientRecord,
    theirs: &I,
    changes: &mut Vec<String>,
) -> IngredientPatch
where
    I: IngredientEntry + ?Sized,
{
    let mut patch = IngredientPatch::default();

    if theirs.ingredients_list().chars().count() > ours.ingredients_list.chars().count() {
        changes.push("ingredient list: replaced with longer text".to_string());
        patch.ingredients_list = Some(theirs.ingredients_list().to_string());
    }

    let known: HashSet<&str> = ours.items.iter().map(|item| item.name.as_str()).collect();
    let mut seen = HashSet::new();
    let additions: Vec<_> = theirs
        .items()
        .iter()
        .filter(|item| !known.contains(item.name.as_str()) && seen.insert(item.name.as_str()))
        .cloned()
        .collect();
    if !additions.is_empty() {
        changes.push(format!("ingredient items: added {}", additions.len()));
        let mut items = ours.items.clone();
        items.extend(additions);
        patch.items = Some(items);
    }

    if let Some(candidate) = theirs.health() {
        let better = ours
            .health
            .as_ref()
            .map_or(true, |current| candidate.score > current.score);
        if better {
            changes.push(format!("health score: {}", candidate.score));
            patch.health = Some(candidate.clone());
        }
    }

    patch
}
