//! Single-pass entrypoint: scrape all categories, reconcile against the
//! snapshot database, apply the writes in one transaction.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use matsmartare::application::{CategoryFetcher, Pipeline};
use matsmartare::infrastructure::logging::init_logging;
use matsmartare::infrastructure::{
    AppConfig, DatabaseConnection, HttpClient, ListingParser, SqliteItemRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Path::new("matsmartare.json");
    let config = AppConfig::load(config_path).await?;
    init_logging(&config.logging)?;
    if !config_path.exists() {
        info!("No config file at {}, using defaults", config_path.display());
    }

    let db = DatabaseConnection::new(&config.database_url).await?;
    db.migrate().await?;
    let repository = SqliteItemRepository::new(db.pool().clone());
    repository.seed_categories(&config.categories).await?;

    let http = HttpClient::new(&config.http)?;
    let fetcher = CategoryFetcher::new(
        Arc::new(http),
        ListingParser::new()?,
        config.base_url.clone(),
    );
    let pipeline = Pipeline::new(Arc::new(repository.clone()), Arc::new(fetcher));

    let report = pipeline.run().await?;

    for failed in report.failed_categories() {
        warn!(
            "Category '{}' (id {}) contributed nothing this pass: {}",
            failed.title,
            failed.category_id,
            failed.error.as_deref().unwrap_or("unknown")
        );
    }

    let stats = repository
        .apply_reconciliation(&report.reconciliation, report.pass_time)
        .await?;

    // Disappeared items are reported, never deleted; they keep their rows
    // until a retention policy decides otherwise.
    for gone in &report.reconciliation.disappeared {
        info!(
            "No longer listed: '{}' ({}), last seen {}",
            gone.name, gone.url, gone.last_seen
        );
    }

    info!(
        "Pass finished in {:.1?}: {} candidates, {} canonical, {} inserted, {} updated, {} touched, {} disappeared",
        report.elapsed,
        report.candidate_count,
        report.canonical_count,
        stats.inserted,
        stats.updated,
        stats.touched,
        report.reconciliation.disappeared.len()
    );

    Ok(())
}
