//! Collaborator contracts consumed by the pipeline.
//!
//! The pipeline itself is a pure in-memory computation over data these
//! traits provide; network and storage details live behind them in the
//! infrastructure layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::item::{CanonicalItem, Category, StoredItem};

/// Retrieves raw markup for a listing page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and return its body. Any transport failure
    /// (connect error, timeout, non-2xx status) is an error.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Persistence collaborator for categories and the item snapshot.
///
/// Insert/update operations from one reconciliation pass are expected to
/// be applied within one transaction by the caller, so a crash mid-apply
/// leaves the snapshot either fully pre-pass or fully post-pass.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Load the full persisted item snapshot from the previous pass.
    async fn load_current_items(&self) -> Result<Vec<StoredItem>>;

    /// Insert a new item and return its assigned identity.
    async fn insert_item(&self, item: &CanonicalItem) -> Result<i64>;

    /// Overwrite the stored state of an existing item.
    async fn update_item(&self, id: i64, item: &CanonicalItem) -> Result<()>;
}
