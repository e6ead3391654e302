//! Error types for the metrics crate.

use thiserror::Error;

/// Result type alias for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric {name}: {source}")]
    Register {
        name: String,
        #[source]
        source: prometheus::Error,
    },

    #[error("failed to encode exposition: {0}")]
    Encode(#[source] prometheus::Error),

    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
