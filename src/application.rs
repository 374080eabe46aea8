//! Application layer: the fetch → parse → merge → reconcile use-cases.

pub mod fetcher;
pub mod merge;
pub mod pipeline;
pub mod reconcile;

pub use fetcher::{CategoryFetcher, CategoryHarvest, FetchError};
pub use merge::merge_candidates;
pub use pipeline::{CategoryReport, Pipeline, PipelineReport};
pub use reconcile::reconcile;
