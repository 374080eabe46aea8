//! Typed extraction errors for listing fragments.

use thiserror::Error;

/// A single listing fragment could not be turned into a candidate item.
///
/// Always fragment-local: the owning category keeps processing its other
/// fragments and reports these as skipped-with-reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("required field '{field}' missing or empty in listing fragment")]
    MissingField { field: &'static str },
}

impl ExtractError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;
