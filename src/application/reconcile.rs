//! Reconciliation of the freshly merged canonical set against the
//! persisted snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::item::{CanonicalItem, Reconciliation, StoredItem};

/// Compare the canonical items of this pass against the stored snapshot
/// and derive the required persistence operations.
///
/// - absent from the snapshot → insert
/// - present with a changed name/price/discount/image/category set →
///   update, carrying the persisted identity and first-seen
/// - present and identical → unchanged; identity preserved and
///   `last_seen` still refreshed to `pass_time` (a silent touch, not an
///   update)
///
/// Snapshot items with no canonical counterpart land in `disappeared`;
/// what to do with them is the caller's policy.
pub fn reconcile(
    canonical: Vec<CanonicalItem>,
    persisted: Vec<StoredItem>,
    pass_time: DateTime<Utc>,
) -> Reconciliation {
    let mut snapshot: HashMap<String, StoredItem> = persisted
        .into_iter()
        .map(|item| (item.url.clone(), item))
        .collect();

    let mut result = Reconciliation::default();

    for mut item in canonical {
        item.last_seen = pass_time;
        match snapshot.remove(&item.url) {
            None => result.inserts.push(item),
            Some(stored) => {
                item.id = Some(stored.id);
                // Earliest known sighting wins.
                item.first_seen = stored.first_seen;
                if item.same_listing(&stored) {
                    result.unchanged.push(item);
                } else {
                    result.updates.push(item);
                }
            }
        }
    }

    result.disappeared = snapshot.into_values().collect();
    result.disappeared.sort_by_key(|item| item.id);
    result
}
