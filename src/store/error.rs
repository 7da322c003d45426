//! Error types for session persistence.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Session store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Home directory not found.
    #[error("Failed to get home directory")]
    HomeDirectoryNotFound,

    /// Failed to read the store file.
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the store file.
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store file is not valid JSON.
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the preferences.
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Rejected settings value.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The in-memory store lock was poisoned.
    #[error("Session store lock poisoned")]
    Poisoned,
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_read() {
        let err = StoreError::Read {
            path: PathBuf::from("/tmp/session.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("session.json"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_display_home_directory_not_found() {
        let err = StoreError::HomeDirectoryNotFound;
        assert!(err.to_string().contains("home directory"));
    }
}
