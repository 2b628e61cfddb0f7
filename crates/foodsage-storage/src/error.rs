//! Storage error types for the credential and inventory stores.
//!
//! Every backend maps its native failures onto [`StorageError`] so callers can
//! classify them without knowing which store is behind the trait object.

use crate::kind::ErrorKind;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("Record not found: {entity}/{id}")]
    NotFound {
        /// The kind of record that was not found.
        entity: String,
        /// The key of the record that was not found.
        id: String,
    },

    /// A conditional write lost against a concurrent writer.
    #[error(
        "Version conflict: expected {}, found {}",
        display_version(.expected),
        display_version(.actual)
    )]
    VersionConflict {
        /// The version the writer last read (`None` = record absent).
        expected: Option<u64>,
        /// The version currently stored (`None` = record absent).
        actual: Option<u64>,
    },

    /// Attempted to create a record whose unique key is already taken.
    #[error("Record already exists: {entity}/{id}")]
    AlreadyExists {
        /// The kind of record that already exists.
        entity: String,
        /// The conflicting key.
        id: String,
    },

    /// The record data is invalid for this store.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of why the input is invalid.
        message: String,
    },

    /// The backend did not answer within the configured deadline.
    #[error("Storage operation timed out: {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

fn display_version(version: &Option<u64>) -> String {
    version.map_or_else(|| "absent".to_string(), |v| v.to_string())
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a new `VersionConflict` error.
    #[must_use]
    pub fn version_conflict(expected: Option<u64>, actual: Option<u64>) -> Self {
        Self::VersionConflict { expected, actual }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates a new `ConnectionError`.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a version conflict error.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` if retrying the same call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ConnectionError { .. })
    }

    /// Returns the service-level kind of this error.
    ///
    /// Uniqueness and version conflicts are both `Conflict`; callers that
    /// need to tell them apart use the predicates above.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::VersionConflict { .. } => ErrorKind::Conflict,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::StoreUnavailable,
            Self::ConnectionError { .. } => ErrorKind::StoreUnavailable,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("inventory", "u-1");
        assert_eq!(err.to_string(), "Record not found: inventory/u-1");

        let err = StorageError::version_conflict(Some(1), Some(2));
        assert_eq!(err.to_string(), "Version conflict: expected 1, found 2");

        let err = StorageError::version_conflict(None, Some(3));
        assert_eq!(err.to_string(), "Version conflict: expected absent, found 3");

        let err = StorageError::already_exists("user", "a@b.io");
        assert_eq!(err.to_string(), "Record already exists: user/a@b.io");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::timeout("inventory.get").is_transient());
        assert!(StorageError::connection_error("refused").is_transient());
        assert!(!StorageError::version_conflict(Some(1), Some(2)).is_transient());
        assert!(!StorageError::internal("bug").is_transient());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(StorageError::not_found("user", "1").kind(), ErrorKind::NotFound);
        assert_eq!(
            StorageError::version_conflict(None, Some(1)).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            StorageError::already_exists("user", "a@b.io").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            StorageError::timeout("x").kind(),
            ErrorKind::StoreUnavailable
        );
    }
}
