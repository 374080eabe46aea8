//! matsmartare - price tracker for discount-retail product listings
//!
//! Scrapes a retail site's per-category listing pages, merges duplicate
//! listings into canonical items keyed by product URL, reconciles them
//! against the SQLite snapshot from the previous pass and reports the
//! inserts/updates to apply.

pub mod application;
pub mod domain;
pub mod infrastructure;
