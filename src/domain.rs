//! Domain module - core entities and collaborator contracts
//!
//! Contains the item/category entities flowing through the scrape pipeline
//! and the trait seams the pipeline consumes (page retrieval, persistence).

pub mod collaborators;
pub mod item;

pub use collaborators::{ItemStore, PageFetcher};
pub use item::{CandidateItem, CanonicalItem, Category, Reconciliation, StoredItem};
