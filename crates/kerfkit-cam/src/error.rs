//! Error types for the cut compiler crate.
//!
//! Most failures in the compiler are absorbed locally and reported as
//! [`CompileWarning`](crate::cut::CompileWarning) values next to the cuts.
//! The types here cover the cases that are surfaced as `Result`s:
//! empty chains, engine faults and configuration files.

use kerfkit_core::GeometryError;
use std::io;
use thiserror::Error;

/// Errors that can occur while compiling operations into cuts.
#[derive(Error, Debug)]
pub enum CamError {
    /// The offset engine reported a failure.
    #[error("Offset engine failed: {0}")]
    OffsetEngine(String),

    /// The lead engine reported a failure.
    #[error("Lead engine failed: {0}")]
    LeadEngine(String),

    /// A configuration value is invalid.
    #[error("Invalid config '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// Error from the data model layer.
    #[error(transparent)]
    Core(#[from] kerfkit_core::Error),
}

impl From<GeometryError> for CamError {
    fn from(err: GeometryError) -> Self {
        CamError::Core(err.into())
    }
}

/// Result type alias for compiler operations.
pub type CamResult<T> = Result<T, CamError>;
