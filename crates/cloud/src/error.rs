//! Error types for the catalog and geocoder clients.

use thiserror::Error;

/// Errors produced while talking to the catalog or the geocoder.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Core(#[from] stacscout_core::Error),
}

impl CloudError {
    /// Map a transport-level failure onto the domain error for `context`.
    pub fn into_core(self, context: fn(String) -> stacscout_core::Error) -> stacscout_core::Error {
        match self {
            Self::Core(e) => e,
            other => context(other.to_string()),
        }
    }
}

/// Result alias for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;
