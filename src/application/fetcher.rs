//! Per-category listing retrieval.
//!
//! Each category is one network fetch plus a parse over its fragments.
//! Transport failures fail the whole category and nothing else; fragment
//! failures are collected next to the successful candidates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::domain::collaborators::PageFetcher;
use crate::domain::item::{CandidateItem, Category};
use crate::infrastructure::parsing::{ExtractError, ListingParser};

/// Everything one category's fetch produced.
#[derive(Debug)]
pub struct CategoryHarvest {
    pub category_id: i64,
    pub items: Vec<CandidateItem>,
    /// Fragments skipped with a reason; the rest of the page still counts.
    pub skipped: Vec<ExtractError>,
}

/// A category's listing page was unreachable or unreadable at the
/// transport level. Carried as a value so one category's failure never
/// cancels the others.
#[derive(Error, Debug)]
#[error("category '{}' ({}) failed: {cause}", .category.title, .category.url)]
pub struct FetchError {
    pub category: Category,
    #[source]
    pub cause: anyhow::Error,
}

pub struct CategoryFetcher {
    pages: Arc<dyn PageFetcher>,
    parser: ListingParser,
    base_url: String,
}

impl CategoryFetcher {
    pub fn new(pages: Arc<dyn PageFetcher>, parser: ListingParser, base_url: String) -> Self {
        Self { pages, parser, base_url }
    }

    /// Fetch one category's listing page and extract its candidates.
    pub async fn fetch_category(
        &self,
        category: &Category,
        seen_at: DateTime<Utc>,
    ) -> Result<CategoryHarvest, FetchError> {
        let url = self.listing_url(&category.url);
        debug!("Fetching category '{}' from {}", category.title, url);

        let body = self
            .pages
            .fetch_page(&url)
            .await
            .map_err(|cause| FetchError { category: category.clone(), cause })?;

        let (items, skipped) = self.parser.parse_listing(&body, category.id, seen_at);
        Ok(CategoryHarvest { category_id: category.id, items, skipped })
    }

    fn listing_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixturePage(String);

    #[async_trait]
    impl PageFetcher for FixturePage {
        async fn fetch_page(&self, _url: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct DownPage;

    #[async_trait]
    impl PageFetcher for DownPage {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            Err(anyhow!("connection refused: {url}"))
        }
    }

    fn category() -> Category {
        Category { id: 4, url: "/skafferi".to_string(), title: "Skafferi".to_string() }
    }

    fn fetcher(pages: Arc<dyn PageFetcher>) -> CategoryFetcher {
        CategoryFetcher::new(
            pages,
            ListingParser::new().unwrap(),
            "http://www.matsmart.se".to_string(),
        )
    }

    #[tokio::test]
    async fn successful_fetch_yields_candidates_and_skips() {
        let html = r#"
            <div class="prd"><a href="/produkt/a">
                <img class="zoom" src="//cdn.example.com/a.jpg">
                <span class="prd-name">A</span>
                <div class="prd-price-num">10</div>
            </a></div>
            <div class="prd"><a href="/produkt/b">
                <span class="prd-name">B utan bild</span>
                <div class="prd-price-num">20</div>
            </a></div>
        "#;
        let fetcher = fetcher(Arc::new(FixturePage(html.to_string())));
        let seen_at = Utc.timestamp_opt(1_500_000_000, 0).unwrap();

        let harvest = fetcher.fetch_category(&category(), seen_at).await.unwrap();
        assert_eq!(harvest.category_id, 4);
        assert_eq!(harvest.items.len(), 1);
        assert_eq!(harvest.items[0].url, "/produkt/a");
        assert_eq!(harvest.skipped.len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_fails_the_whole_category() {
        let fetcher = fetcher(Arc::new(DownPage));
        let seen_at = Utc.timestamp_opt(1_500_000_000, 0).unwrap();

        let err = fetcher.fetch_category(&category(), seen_at).await.unwrap_err();
        assert_eq!(err.category.id, 4);
        assert!(err.to_string().contains("Skafferi"));
    }
}
