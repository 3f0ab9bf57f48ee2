//! Error handling for KerfKit core
//!
//! Provides the error type for the data model layer:
//! - Geometry errors (chains that cannot be machined)
//! - I/O and serialization errors for job documents
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Chain contains no shapes
    #[error("Chain {chain_id} has no shapes")]
    EmptyChain {
        /// The chain identifier.
        chain_id: String,
    },
}

/// Main error type for KerfKit core
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_is_transparent() {
        let err: Error = GeometryError::EmptyChain {
            chain_id: "c1".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Geometry(_)));
        assert_eq!(err.to_string(), "Chain c1 has no shapes");
    }

    #[test]
    fn test_serialization_error_converts() {
        let err: Error = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err().into();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
