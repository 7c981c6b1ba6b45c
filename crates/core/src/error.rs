//! Error types for sb-core
//!
//! Enumeration errors (bad root path) are fatal and abort a run before any
//! upload attempt; per-file transfer errors are wrapped in
//! [`Error::Transfer`] and stay local to that file.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the upload engine
#[derive(Error, Debug)]
pub enum Error {
    /// Path or object does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A single file's upload failed in the transport collaborator
    #[error("transfer failed for '{key}': {reason}")]
    Transfer { key: String, reason: String },

    /// Network-level failure talking to the object store
    #[error("network error: {0}")]
    Network(String),

    /// Authentication or credential resolution failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or unusable path
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for errors that don't fit other categories
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap an arbitrary error as a per-file transfer failure.
    ///
    /// Local not-found errors pass through unchanged: a source file that
    /// vanished mid-run is unrecoverable and must abort the batch rather
    /// than count as a per-file failure.
    pub fn into_transfer(self, key: &str) -> Error {
        match self {
            Error::NotFound(_) => self,
            other => Error::Transfer {
                key: key.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_wrapping() {
        let err = Error::Network("connection reset".to_string()).into_transfer("media/a.mp4");
        match err {
            Error::Transfer { key, reason } => {
                assert_eq!(key, "media/a.mp4");
                assert!(reason.contains("connection reset"));
            }
            other => panic!("expected Transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_passes_through() {
        let err = Error::NotFound("/data/x.mp4".to_string()).into_transfer("x.mp4");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_display() {
        let err = Error::Transfer {
            key: "k".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "transfer failed for 'k': boom");
    }
}
