//! Error types for cardbox.
//!
//! This module defines all error types used throughout the cardbox crate.
//! Callers can tell invalid input (`Validation`), missing records
//! (`NotFound`), and storage failures apart without string matching.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for cardbox operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A card failed validation before any storage I/O was attempted.
    #[error("invalid card: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    // === Lookup Errors ===
    /// An operation referenced a card id with no matching record.
    #[error("no card with id {id}")]
    NotFound {
        /// The id that did not match any card.
        id: i64,
    },

    // === Storage Errors ===
    /// Failed to open or create the card store.
    #[error("failed to open card store at {path}: {source}")]
    DatabaseOpen {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A store read, write, or transaction failed.
    #[error("card store query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run store migrations.
    #[error("card store migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for cardbox operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error for the given card id.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create a new migration error.
    #[must_use]
    pub fn migration(message: impl Into<String>) -> Self {
        Self::DatabaseMigration {
            message: message.into(),
        }
    }

    /// Check if this error means the caller's input was rejected.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means the referenced card does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error means the store itself failed.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::DirectoryCreate { .. }
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("first_name must not be empty");
        assert_eq!(
            err.to_string(),
            "invalid card: first_name must not be empty"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let err = Error::not_found(42);
        assert_eq!(err.to_string(), "no card with id 42");
    }

    #[test]
    fn test_migration_error_display() {
        let err = Error::migration("unknown version 7");
        assert!(err.to_string().contains("unknown version 7"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::validation("x").is_validation());
        assert!(!Error::validation("x").is_not_found());
        assert!(!Error::validation("x").is_storage());

        assert!(Error::not_found(1).is_not_found());
        assert!(!Error::not_found(1).is_storage());

        assert!(Error::migration("x").is_storage());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.is_storage());
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
            assert!(err.is_storage());
        }
    }

    #[test]
    fn test_database_open_error_display() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err = Error::DatabaseOpen {
                path: PathBuf::from("/nonexistent/path/db.sqlite"),
                source: sqlite_err,
            };
            assert!(err.to_string().contains("/nonexistent/path/db.sqlite"));
            assert!(err.is_storage());
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
        assert!(err.is_storage());
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "busy_timeout_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("busy_timeout_ms"));
        assert!(!err.is_storage());
    }
}
