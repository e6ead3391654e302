//! Error types for the fetch crate.

use thiserror::Error;

use copilot_core::ConfigError;

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that escape the fetcher. Upstream failures are not among them:
/// those degrade to an empty snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// True for missing credential or organization.
    pub fn is_configuration(&self) -> bool {
        matches!(self, FetchError::Config(_))
    }
}
