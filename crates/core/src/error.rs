//! Error types for StacScout

use thiserror::Error;

/// Rejections raised while turning form input into a search request.
///
/// All of these block submission and are fully recoverable by correcting
/// the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select at least one collection.")]
    NoCollectionsSelected,

    #[error("Invalid location/bbox: {0}")]
    InvalidBoundingBox(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Start date is after end date")]
    InvertedDateRange,
}

/// Main error type for StacScout operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to load collections: {0}")]
    RegistryUnavailable(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Location not found: {0}")]
    GeocodeNotFound(String),

    #[error("A request is already in flight")]
    Busy,

    #[error("No further pages available")]
    NoMorePages,

    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },
}

/// Result type alias for StacScout operations
pub type Result<T> = std::result::Result<T, Error>;
