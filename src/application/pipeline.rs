//! Pipeline orchestrator: one full fetch-parse-merge-reconcile pass.
//!
//! Every category gets its own fetch task; the tasks are joined before
//! merging so one failing category neither cancels nor blocks the others.
//! Persistence failures abort the pass; the caller applies the resulting
//! writes in one transaction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::fetcher::CategoryFetcher;
use crate::application::merge::merge_candidates;
use crate::application::reconcile::reconcile;
use crate::domain::collaborators::ItemStore;
use crate::domain::item::Reconciliation;

/// Per-category outcome of one pass, success or failure.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category_id: i64,
    pub title: String,
    pub items: usize,
    /// Fragments skipped with an extraction error.
    pub skipped: usize,
    /// Transport-level failure; the category contributed nothing.
    pub error: Option<String>,
}

/// Result of one pipeline pass, handed to the caller for applying.
#[derive(Debug)]
pub struct PipelineReport {
    pub reconciliation: Reconciliation,
    pub categories: Vec<CategoryReport>,
    pub candidate_count: usize,
    pub canonical_count: usize,
    pub pass_time: DateTime<Utc>,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn failed_categories(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| c.error.is_some())
    }
}

pub struct Pipeline {
    store: Arc<dyn ItemStore>,
    fetcher: Arc<CategoryFetcher>,
}

impl Pipeline {
    pub fn new(store: Arc<dyn ItemStore>, fetcher: Arc<CategoryFetcher>) -> Self {
        Self { store, fetcher }
    }

    /// Run one pass with the current time as the pass timestamp.
    pub async fn run(&self) -> Result<PipelineReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one pass with an explicit pass timestamp.
    pub async fn run_at(&self, pass_time: DateTime<Utc>) -> Result<PipelineReport> {
        let started = Instant::now();

        let categories = self.store.list_categories().await?;
        info!("Starting pass over {} categories", categories.len());

        // Fan out: one independent task per category.
        let mut tasks = Vec::with_capacity(categories.len());
        for category in categories {
            let fetcher = Arc::clone(&self.fetcher);
            tasks.push(tokio::spawn(async move {
                let outcome = fetcher.fetch_category(&category, pass_time).await;
                (category, outcome)
            }));
        }

        // Fan in: wait for every task, carrying failures as values.
        let results = futures::future::join_all(tasks).await;

        let mut reports = Vec::with_capacity(results.len());
        let mut harvests = Vec::new();
        for result in results {
            let (category, outcome) = result.context("Category fetch task panicked")?;
            match outcome {
                Ok(harvest) => {
                    reports.push(CategoryReport {
                        category_id: category.id,
                        title: category.title,
                        items: harvest.items.len(),
                        skipped: harvest.skipped.len(),
                        error: None,
                    });
                    harvests.push(harvest.items);
                }
                Err(e) => {
                    warn!("Excluding category from this pass: {}", e);
                    reports.push(CategoryReport {
                        category_id: category.id,
                        title: category.title,
                        items: 0,
                        skipped: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let candidate_count = harvests.iter().map(Vec::len).sum();
        let canonical = merge_candidates(harvests);
        let canonical_count = canonical.len();

        let persisted = self.store.load_current_items().await?;
        info!(
            "Merged {} candidates into {} canonical items; snapshot holds {}",
            candidate_count,
            canonical_count,
            persisted.len()
        );

        let reconciliation = reconcile(canonical, persisted, pass_time);
        info!(
            "Reconciled: {} to insert, {} to update, {} unchanged, {} disappeared",
            reconciliation.inserts.len(),
            reconciliation.updates.len(),
            reconciliation.unchanged.len(),
            reconciliation.disappeared.len()
        );

        Ok(PipelineReport {
            reconciliation,
            categories: reports,
            candidate_count,
            canonical_count,
            pass_time,
            elapsed: started.elapsed(),
        })
    }
}
