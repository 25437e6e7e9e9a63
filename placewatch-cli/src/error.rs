//! CLI error type.

use thiserror::Error;

use placewatch::feed::TrackParseError;
use placewatch::storage::StorageError;

/// Errors surfaced to the terminal user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad argument or configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A replay track file could not be parsed.
    #[error(transparent)]
    Track(#[from] TrackParseError),

    /// Filesystem failure outside the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create the Tokio runtime.
    #[error("failed to create async runtime: {0}")]
    RuntimeCreation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("missing value".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("missing value"));
    }
}
