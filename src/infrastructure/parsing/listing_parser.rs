//! Listing-page parser: turns raw markup into candidate items.
//!
//! One malformed fragment never aborts the rest of the page; it is
//! collected as an [`ExtractError`] alongside the successful candidates.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::error::{ExtractError, ExtractResult};
use crate::domain::item::CandidateItem;

/// CSS selectors for the listing page elements.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    /// One fragment per product; its primary link carries the identity URL.
    pub fragment: String,
    pub image: String,
    pub name: String,
    pub price: String,
    pub old_price: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            fragment: "div.prd > a".to_string(),
            image: "img.zoom".to_string(),
            name: "span.prd-name".to_string(),
            price: "div.prd-price-num".to_string(),
            old_price: "span.prd-discount-oldprice > span".to_string(),
        }
    }
}

/// Parser for extracting candidate items from a category listing page.
pub struct ListingParser {
    fragment_selector: Selector,
    image_selector: Selector,
    name_selector: Selector,
    price_selector: Selector,
    old_price_selector: Selector,
}

impl ListingParser {
    /// Create a parser with the default selectors.
    pub fn new() -> Result<Self> {
        Self::with_selectors(&ListingSelectors::default())
    }

    /// Create a parser with custom selector configuration.
    pub fn with_selectors(selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            fragment_selector: compile(&selectors.fragment)?,
            image_selector: compile(&selectors.image)?,
            name_selector: compile(&selectors.name)?,
            price_selector: compile(&selectors.price)?,
            old_price_selector: compile(&selectors.old_price)?,
        })
    }

    /// Parse a listing page body into candidates and per-fragment errors.
    pub fn parse_listing(
        &self,
        html: &str,
        category_id: i64,
        seen_at: DateTime<Utc>,
    ) -> (Vec<CandidateItem>, Vec<ExtractError>) {
        let document = Html::parse_document(html);
        let mut items = Vec::new();
        let mut skipped = Vec::new();

        for fragment in document.select(&self.fragment_selector) {
            match self.extract_item(fragment, category_id, seen_at) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("Skipping fragment in category {}: {}", category_id, e);
                    skipped.push(e);
                }
            }
        }

        debug!(
            "Extracted {} items ({} skipped) for category {}",
            items.len(),
            skipped.len(),
            category_id
        );
        (items, skipped)
    }

    /// Extract one candidate item from a listing fragment.
    pub fn extract_item(
        &self,
        fragment: ElementRef,
        category_id: i64,
        seen_at: DateTime<Utc>,
    ) -> ExtractResult<CandidateItem> {
        let url = fragment
            .value()
            .attr("href")
            .ok_or_else(|| ExtractError::missing_field("url"))?
            .to_string();

        let image_url = self
            .first_attr(fragment, &self.image_selector, "src")
            .map(normalize_image_url)
            .ok_or_else(|| ExtractError::missing_field("image"))?;

        let name = self
            .first_text(fragment, &self.name_selector)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ExtractError::missing_field("name"))?;

        // Known precision gap: only the first run of digits is kept, so a
        // formatted price like "29:90" is stored as "29". Preserved as-is
        // because stored snapshots are compared on this representation.
        let price = self
            .first_text(fragment, &self.price_selector)
            .and_then(|text| first_digit_run(&text).map(str::to_string))
            .ok_or_else(|| ExtractError::missing_field("price"))?;

        // Absence of the old-price element means "no discount".
        let discount = self
            .first_text(fragment, &self.old_price_selector)
            .map(|text| strip_parenthesis_decoration(&text))
            .unwrap_or_default();

        Ok(CandidateItem {
            category_id,
            url,
            image_url,
            name,
            price,
            discount,
            seen_at,
        })
    }

    fn first_text(&self, fragment: ElementRef, selector: &Selector) -> Option<String> {
        fragment
            .select(selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
    }

    fn first_attr(&self, fragment: ElementRef, selector: &Selector, name: &str) -> Option<String> {
        fragment
            .select(selector)
            .next()
            .and_then(|e| e.value().attr(name))
            .map(str::to_string)
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector '{selector}': {e}"))
}

/// Strip the cache-busting `?itok=...` suffix and complete
/// protocol-relative sources with a scheme.
fn normalize_image_url(src: String) -> String {
    let stripped = match src.find("?itok=") {
        Some(pos) => &src[..pos],
        None => src.as_str(),
    };
    if stripped.starts_with("//") {
        format!("http:{stripped}")
    } else {
        stripped.to_string()
    }
}

/// First contiguous run of ASCII digits, if any.
fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Old-price text arrives wrapped in decoration like `(59:90)`; keep only
/// what is inside the outermost parentheses when both are present.
fn strip_parenthesis_decoration(text: &str) -> String {
    let trimmed = text.trim();
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => trimmed[open + 1..close].trim().to_string(),
        _ => trimmed.to_string(),
    }
}
