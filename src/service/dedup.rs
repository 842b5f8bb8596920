use crate::{
    config::DedupConfig,
    engine::{
        batch::{group_duplicates, BatchOptions, DeduplicationReport},
        candidates::find_candidates,
        policy::{decide, Resolution},
        stats::{sample_stats, DedupStats},
    },
    error::AppResult,
    model::{IngredientEntry, NewIngredients, NewProduct},
    store::CatalogStore,
};

/// Insert-time duplicate check against the current corpus.
///
/// Never fails: when the corpus cannot be read the resolution recommends
/// inserting anyway and carries the error.
pub async fn check_duplication(
    store: &dyn CatalogStore,
    product: &NewProduct,
    ingredients: Option<&NewIngredients>,
    config: &DedupConfig,
) -> Resolution {
    match try_check(store, product, ingredients, config).await {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::error!(
                error = %err,
                name = product.name,
                "duplicate check failed, letting the entry through"
            );
            Resolution::fail_open(err)
        }
    }
}

async fn try_check(
    store: &dyn CatalogStore,
    product: &NewProduct,
    ingredients: Option<&NewIngredients>,
    config: &DedupConfig,
) -> AppResult<Resolution> {
    let corpus = store.list_products().await?;
    let corpus_ingredients = store.list_ingredients().await?;

    let candidates = find_candidates(
        product,
        ingredients.map(|i| i.ingredients_list()),
        &corpus,
        &corpus_ingredients,
        config,
    );
    let resolution = decide(candidates);

    tracing::info!(
        brand = product.brand,
        name = product.name,
        duplicates = resolution.duplicate_count,
        recommendation = resolution.recommendation.as_str(),
        "duplicate check finished"
    );

    Ok(resolution)
}

/// Sweep the corpus for duplicate groups and, unless dry-running, delete every
/// non-canonical member. Deletion failures are collected in the report and never
/// stop the sweep.
pub async fn run_batch(
    store: &dyn CatalogStore,
    options: BatchOptions,
    config: &DedupConfig,
) -> AppResult<DeduplicationReport> {
    options.validate()?;

    let corpus = match store.list_products().await {
        Ok(corpus) => corpus,
        Err(err) => {
            tracing::error!(error = %err, "batch deduplication could not read the catalog");
            return Ok(DeduplicationReport::failed(options.dry_run, err));
        }
    };

    let entries = &corpus[..corpus.len().min(options.max_processed)];
    let run_config = options.effective_config(config);

    tracing::info!(
        total = corpus.len(),
        processing = entries.len(),
        threshold = run_config.thresholds.overall,
        dry_run = options.dry_run,
        "batch deduplication started"
    );

    let groups = group_duplicates(entries, &run_config);
    let mut report =
        DeduplicationReport::begin(options.dry_run, corpus.len(), entries.len(), &groups);

    if !options.dry_run {
        for group in &groups {
            for duplicate in &group.duplicates {
                match store.delete_product(duplicate.id).await {
                    Ok(0) => {
                        tracing::error!(product_id = %duplicate.id, "duplicate vanished before deletion");
                        report.record_failure(duplicate, "product not found");
                        continue;
                    }
                    Ok(_) => {
                        tracing::info!(
                            product_id = %duplicate.id,
                            name = duplicate.name,
                            master_id = %group.canonical.id,
                            "duplicate removed"
                        );
                        report.record_removal(duplicate, &group.canonical);
                    }
                    Err(err) => {
                        tracing::error!(product_id = %duplicate.id, error = %err, "failed to delete duplicate");
                        report.record_failure(duplicate, err.to_string());
                        continue;
                    }
                }

                if let Err(err) = store.delete_ingredients_by_product(duplicate.id).await {
                    tracing::error!(
                        product_id = %duplicate.id,
                        error = %err,
                        "failed to delete ingredients of removed duplicate"
                    );
                    report.record_failure(duplicate, format!("ingredients not removed: {err}"));
                }
            }
        }
    }

    let report = report.finish();
    tracing::info!(
        processed = report.processed,
        groups = report.summary.duplicate_groups,
        found = report.duplicates_found,
        removed = report.duplicates_removed,
        errors = report.errors.len(),
        "batch deduplication finished"
    );
    Ok(report)
}

pub async fn stats(store: &dyn CatalogStore, config: &DedupConfig) -> AppResult<DedupStats> {
    let corpus = store.list_products().await?;
    Ok(sample_stats(&corpus, config))
}
