//! HTML parsing infrastructure for product listing pages.
//!
//! Selectors are compiled once at parser construction; extraction is
//! best-effort per listing fragment with typed errors for the fragments
//! that cannot yield a usable record.

pub mod error;
pub mod listing_parser;

pub use error::{ExtractError, ExtractResult};
pub use listing_parser::{ListingParser, ListingSelectors};
