//! Extraction error types

use thiserror::Error;

use crate::page::PageError;

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while extracting a page state
///
/// Most capability failures degrade inside the extractors (fallback trees,
/// dropped screenshots); an error here means no degraded output was
/// possible.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page capability failed in a way no fallback covers
    #[error("page error during extraction: {0}")]
    Page(#[from] PageError),
}
