//! Error types for SOWONEE Gallery.

use thiserror::Error;

/// Result type alias using the gallery's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gallery operations.
///
/// The filter engine itself never fails; these variants cover the
/// persistence backends and the host-side record sources.
#[derive(Error, Debug)]
pub enum Error {
    /// Persistent storage rejected a read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record source (fetch) failed
    #[error("Source error: {0}")]
    Source(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Storage error: quota exceeded");
    }

    #[test]
    fn test_error_display_source() {
        let err = Error::Source("connection reset".to_string());
        assert_eq!(err.to_string(), "Source error: connection reset");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<Vec<String>>("[\"trunc").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
