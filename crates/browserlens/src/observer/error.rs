//! Observation error types

use thiserror::Error;

use crate::extract::ExtractError;

/// Result type for observations
pub type ObserveResult<T> = Result<T, ObserveError>;

/// Errors raised by [`crate::observer::Observer::observe`]
///
/// Raised only when the page capability is entirely unusable; degraded
/// paths inside the pipeline produce output instead of failing. The caller
/// may [`crate::observer::Observer::reset`] and retry.
#[derive(Debug, Error)]
pub enum ObserveError {
    /// Extraction failed with no degraded output available
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}
