//! Cross-category merge of candidate items into canonical items.

use std::collections::HashMap;

use crate::domain::item::{CandidateItem, CanonicalItem};

/// Merge per-category candidate sequences into one canonical item set
/// keyed by product URL.
///
/// The first candidate seen for a URL (in input order, category by
/// category) provides all non-identity fields; later candidates for the
/// same URL contribute only their category membership. That makes the
/// result's membership independent of category order while keeping field
/// values and output order deterministic.
pub fn merge_candidates(per_category: Vec<Vec<CandidateItem>>) -> Vec<CanonicalItem> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<CanonicalItem> = Vec::new();

    for items in per_category {
        for candidate in items {
            match index.get(&candidate.url) {
                Some(&position) => merged[position].add_category(candidate.category_id),
                None => {
                    index.insert(candidate.url.clone(), merged.len());
                    merged.push(CanonicalItem::from_candidate(candidate));
                }
            }
        }
    }

    merged
}
