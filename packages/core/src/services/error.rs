//! Service Layer Error Types
//!
//! This module defines the errors the reference repair services surface to
//! their callers. Lookup misses are not errors here: unresolvable and
//! out-of-subtree references are recovered locally. What remains are broken
//! preconditions and store access failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by copy processing, branch handling and configuration
#[derive(Error, Debug)]
pub enum DeepCopyError {
    /// A required pipeline parameter was not supplied
    #[error("Missing required parameter: {name}")]
    MissingParameter { name: String },

    /// The copy destination does not exist
    #[error("Destination not found: {destination}")]
    DestinationNotFound { destination: String },

    /// The request targets a different store than the one configured
    #[error("Unknown database '{requested}' (store is '{configured}')")]
    UnknownDatabase {
        requested: String,
        configured: String,
    },

    /// Presentation definition could not be written back
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration values failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("Failed to read configuration at {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Store access failed; never retried
    #[error("Store operation failed: {0}")]
    Store(#[from] anyhow::Error),
}

impl DeepCopyError {
    /// Create a missing parameter error
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Create a destination not found error
    pub fn destination_not_found(destination: impl Into<String>) -> Self {
        Self::DestinationNotFound {
            destination: destination.into(),
        }
    }

    /// Create an unknown database error
    pub fn unknown_database(requested: impl Into<String>, configured: impl Into<String>) -> Self {
        Self::UnknownDatabase {
            requested: requested.into(),
            configured: configured.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a configuration I/O error
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_error() {
        let err = DeepCopyError::missing_parameter("destination");
        assert!(matches!(err, DeepCopyError::MissingParameter { .. }));
        assert_eq!(
            format!("{}", err),
            "Missing required parameter: destination"
        );
    }

    #[test]
    fn test_unknown_database_error() {
        let err = DeepCopyError::unknown_database("web", "master");
        assert_eq!(
            format!("{}", err),
            "Unknown database 'web' (store is 'master')"
        );
    }

    #[test]
    fn test_store_error_wraps_anyhow() {
        let err: DeepCopyError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, DeepCopyError::Store(_)));
        assert_eq!(format!("{}", err), "Store operation failed: connection reset");
    }
}
