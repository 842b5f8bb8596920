use anyhow::Context;
use catalog_dedup::{
    config::AppConfig,
    engine::batch::BatchOptions,
    model::{NewIngredients, NewProduct},
    service,
    store::{self, CatalogStore},
    util::{category::canonical_categories, similarity::similarity_details},
};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use std::{
    path::Path,
    sync::{Arc, OnceLock},
};
use tracing_appender::rolling;
use tracing_subscriber::{
    filter::filter_fn, fmt::layer as fmt_layer, prelude::*, EnvFilter, Registry,
};

const CRATE_TARGET: &str = "catalog_dedup";

#[derive(Parser)]
#[command(name = "catalog-dedup", about = "Find and remove duplicate catalog entries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Approximate duplicate figures over a sample of the catalog.
    Stats,
    /// Group duplicates across the catalog; deletes only with --apply.
    Batch {
        /// Duplicate cut-off for this run, in [0, 1].
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        max_processed: Option<usize>,
        /// Delete non-canonical duplicates instead of only reporting them.
        #[arg(long)]
        apply: bool,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Check one entry against the catalog without storing it.
    Check {
        #[arg(long)]
        brand: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        ingredients: Option<String>,
    },
    /// Show how two strings compare after normalization.
    Compare { left: String, right: String },
    /// List the canonical categories raw labels are mapped onto.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().context("failed to load configuration")?;
    setup_tracing(&config)?;

    match cli.command {
        Command::Compare { left, right } => {
            print_json(&similarity_details(&left, &right))?;
        }
        Command::Categories => {
            print_json(&canonical_categories())?;
        }
        Command::Stats => {
            let store = open_store(&config).await?;
            let stats = service::dedup::stats(store.as_ref(), &config.dedup).await?;
            print_json(&stats)?;
        }
        Command::Batch {
            threshold,
            max_processed,
            apply,
            yes,
        } => {
            let store = open_store(&config).await?;
            let preview = BatchOptions {
                dry_run: true,
                threshold,
                max_processed: max_processed.unwrap_or(config.dedup.max_processed),
            };

            if apply {
                let stats = service::dedup::stats(store.as_ref(), &config.dedup).await?;
                print_json(&stats)?;
            }

            let report = service::dedup::run_batch(store.as_ref(), preview, &config.dedup).await?;
            print_json(&report)?;

            if !apply || report.duplicates_found == 0 {
                return Ok(());
            }

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete {} duplicate products?",
                        report.duplicates_found
                    ))
                    .default(false)
                    .interact()
                    .context("failed to read confirmation")?;
            if !confirmed {
                tracing::info!("batch deletion cancelled");
                return Ok(());
            }

            let options = BatchOptions {
                dry_run: false,
                ..preview
            };
            let report = service::dedup::run_batch(store.as_ref(), options, &config.dedup).await?;
            print_json(&report)?;
        }
        Command::Check {
            brand,
            name,
            category,
            ingredients,
        } => {
            let store = open_store(&config).await?;
            let product = NewProduct {
                brand,
                name,
                category,
                ..Default::default()
            };
            let ingredients = ingredients.map(|ingredients_list| NewIngredients {
                ingredients_list,
                ..Default::default()
            });
            let resolution = service::dedup::check_duplication(
                store.as_ref(),
                &product,
                ingredients.as_ref(),
                &config.dedup,
            )
            .await;
            print_json(&resolution)?;
        }
    }

    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CatalogStore>> {
    let store = store::connect(&config.db)
        .await
        .context("failed to open catalog store")?;
    tracing::info!(backend = store.backend(), "catalog store ready");
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn setup_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .logging
            .level
            .clone()
            .unwrap_or_else(|| "info".to_string());
        EnvFilter::new(level)
    });

    let log_path = Path::new(&config.logging.file);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = log_path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid log file path"))?;
    let directory = log_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| Path::new(".").to_path_buf());

    let file_appender = rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
    let _ = FILE_GUARD.set(guard);

    let crate_filter = filter_fn(|meta| meta.target().starts_with(CRATE_TARGET));
    let other_filter = filter_fn(|meta| !meta.target().starts_with(CRATE_TARGET));

    // stdout carries the JSON output, so console logs go to stderr
    let console_crate = fmt_layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_filter(crate_filter.clone());

    let console_general = fmt_layer()
        .with_writer(std::io::stderr)
        .with_filter(other_filter);

    let file_layer = fmt_layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(crate_filter);

    Registry::default()
        .with(env_filter)
        .with(console_crate)
        .with(console_general)
        .with(file_layer)
        .try_init()
        .context("failed to init tracing subscriber")?;

    Ok(())
}
