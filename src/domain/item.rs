//! Item and category entities for the fetch-parse-merge-reconcile pipeline.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A site section whose listing page enumerates products.
///
/// Loaded from persistence at the start of a pass and treated as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    /// Listing-page path relative to the site base URL, e.g. `/kampanj`.
    pub url: String,
    pub title: String,
}

/// A product record as extracted from one category's listing page,
/// before cross-category merging. Exists only within one fetch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub category_id: i64,
    /// External product URL; the sole stable identity key across categories.
    pub url: String,
    pub image_url: String,
    pub name: String,
    /// Currency-less numeric text as scraped (integer digit run only).
    pub price: String,
    /// Empty string means "no discount".
    pub discount: String,
    pub seen_at: DateTime<Utc>,
}

/// The deduplicated representation of a product across every category it
/// appears in. `id` is assigned by the persistence layer on insert and is
/// `None` until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub id: Option<i64>,
    pub categories: BTreeSet<i64>,
    pub url: String,
    pub image_url: String,
    pub name: String,
    pub price: String,
    pub discount: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl CanonicalItem {
    /// Seed a canonical item from the first candidate observed for its URL.
    pub fn from_candidate(candidate: CandidateItem) -> Self {
        let mut categories = BTreeSet::new();
        categories.insert(candidate.category_id);
        Self {
            id: None,
            categories,
            url: candidate.url,
            image_url: candidate.image_url,
            name: candidate.name,
            price: candidate.price,
            discount: candidate.discount,
            first_seen: candidate.seen_at,
            last_seen: candidate.seen_at,
        }
    }

    /// Record membership in another category. Set semantics: re-adding an
    /// already known category id is a no-op.
    pub fn add_category(&mut self, category_id: i64) {
        self.categories.insert(category_id);
    }

    /// Whether this item matches the stored snapshot on every compared
    /// field. Timestamps are excluded: `last_seen` is refreshed on every
    /// pass without counting as a change.
    pub fn same_listing(&self, stored: &StoredItem) -> bool {
        self.name == stored.name
            && self.price == stored.price
            && self.discount == stored.discount
            && self.image_url == stored.image_url
            && self.categories == stored.categories
    }
}

/// The last persisted state of a canonical item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: i64,
    pub categories: BTreeSet<i64>,
    pub url: String,
    pub image_url: String,
    pub name: String,
    pub price: String,
    pub discount: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Serialize a category set into the ordered comma-joined column format.
pub fn categories_to_column(categories: &BTreeSet<i64>) -> String {
    categories
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the stored comma-joined category list back into a set.
/// Unparseable entries are dropped rather than failing the whole row.
pub fn categories_from_column(column: &str) -> BTreeSet<i64> {
    column
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// The persistence operations required to bring the stored snapshot in
/// line with the current pass, plus the items that vanished from the site.
///
/// `inserts`, `updates` and `unchanged` are disjoint over the canonical
/// items of one pass. `disappeared` holds stored items with no canonical
/// counterpart; deletion or archival policy belongs to the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub inserts: Vec<CanonicalItem>,
    /// Carry the persisted identity in `id`.
    pub updates: Vec<CanonicalItem>,
    pub unchanged: Vec<CanonicalItem>,
    pub disappeared: Vec<StoredItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(category_id: i64, url: &str) -> CandidateItem {
        CandidateItem {
            category_id,
            url: url.to_string(),
            image_url: format!("http://img.example.com{url}.jpg"),
            name: "Test item".to_string(),
            price: "100".to_string(),
            discount: String::new(),
            seen_at: Utc.timestamp_opt(1_500_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn seeding_from_candidate_sets_single_category() {
        let item = CanonicalItem::from_candidate(candidate(3, "/p1"));
        assert_eq!(item.id, None);
        assert_eq!(item.categories.iter().copied().collect::<Vec<_>>(), [3]);
        assert_eq!(item.first_seen, item.last_seen);
    }

    #[test]
    fn add_category_is_idempotent() {
        let mut item = CanonicalItem::from_candidate(candidate(3, "/p1"));
        item.add_category(5);
        item.add_category(5);
        item.add_category(3);
        assert_eq!(item.categories.len(), 2);
    }

    #[test]
    fn categories_column_round_trip_is_ordered() {
        let set: BTreeSet<i64> = [9, 1, 4].into_iter().collect();
        let column = categories_to_column(&set);
        assert_eq!(column, "1,4,9");
        assert_eq!(categories_from_column(&column), set);
    }

    #[test]
    fn categories_column_drops_garbage_entries() {
        assert_eq!(
            categories_from_column("1, 2,x,,3"),
            [1, 2, 3].into_iter().collect()
        );
    }

    #[test]
    fn same_listing_ignores_timestamps() {
        let item = CanonicalItem::from_candidate(candidate(1, "/p1"));
        let stored = StoredItem {
            id: 7,
            categories: item.categories.clone(),
            url: item.url.clone(),
            image_url: item.image_url.clone(),
            name: item.name.clone(),
            price: item.price.clone(),
            discount: item.discount.clone(),
            first_seen: Utc.timestamp_opt(1_000, 0).unwrap(),
            last_seen: Utc.timestamp_opt(2_000, 0).unwrap(),
        };
        assert!(item.same_listing(&stored));

        let mut cheaper = item;
        cheaper.price = "50".to_string();
        assert!(!cheaper.same_listing(&stored));
    }
}
