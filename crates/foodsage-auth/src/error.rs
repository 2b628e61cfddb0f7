//! Authentication error types.
//!
//! This module defines the errors returned by the session guard and the
//! account operations, and how they map onto the service-wide
//! [`ErrorKind`] taxonomy.

use foodsage_storage::{ErrorKind, StorageError};

use crate::revocation::RevocationError;

/// Wire message for every 401 response. The specific reason is logged, not sent.
pub const ACCESS_DENIED: &str = "Access denied";

/// Wire message for every 5xx response.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Errors that can occur during authentication and account operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request is malformed or fails an input rule.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable reason, returned to the caller as is.
        message: String,
    },

    /// Login failed. Deliberately the same whether the email or the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request lacks a usable bearer token.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The token failed verification.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Why verification failed.
        reason: String,
    },

    /// The token was revoked by a logout.
    #[error("Token revoked")]
    TokenRevoked,

    /// The authenticated user may not act on the requested resource.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// The user referenced by a valid token does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Registration with an email that is already taken.
    #[error("User already exists")]
    UserExists,

    /// A backing store could not answer.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the store failure.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `StoreUnavailable` error.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
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

    /// Returns `true` if this error means the caller is not authenticated.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == ErrorKind::Unauthenticated
    }

    /// Returns the service-level kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Unauthenticated,
            Self::InvalidToken { .. } => ErrorKind::Unauthenticated,
            Self::TokenRevoked => ErrorKind::Unauthenticated,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::UserNotFound => ErrorKind::NotFound,
            Self::UserExists => ErrorKind::Conflict,
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the message sent to the client.
    ///
    /// Authentication failures collapse into one message and server-side
    /// failures never leak their details.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidRequest { message } => message.clone(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::Unauthorized { .. } | Self::InvalidToken { .. } | Self::TokenRevoked => {
                ACCESS_DENIED.to_string()
            }
            Self::Forbidden { .. } => ACCESS_DENIED.to_string(),
            Self::UserNotFound => "User not found".to_string(),
            Self::UserExists => "User already exists".to_string(),
            Self::StoreUnavailable { .. } | Self::Internal { .. } => {
                INTERNAL_SERVER_ERROR.to_string()
            }
        }
    }

    /// Returns the RFC 6750 error code used in the `WWW-Authenticate` header.
    #[must_use]
    pub fn bearer_error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "invalid_request",
            Self::InvalidToken { .. } | Self::TokenRevoked => "invalid_token",
            _ => "server_error",
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists { .. } => Self::UserExists,
            StorageError::NotFound { .. } => Self::UserNotFound,
            StorageError::InvalidInput { message } => Self::InvalidRequest { message },
            StorageError::Internal { message } => Self::Internal { message },
            other => Self::store_unavailable(other.to_string()),
        }
    }
}

impl From<RevocationError> for AuthError {
    fn from(err: RevocationError) -> Self {
        Self::store_unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_request("Email is not valid");
        assert_eq!(err.to_string(), "Invalid request: Email is not valid");

        let err = AuthError::TokenRevoked;
        assert_eq!(err.to_string(), "Token revoked");

        let err = AuthError::invalid_token("expired");
        assert_eq!(err.to_string(), "Invalid token: expired");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(AuthError::InvalidCredentials.kind(), ErrorKind::Validation);
        assert_eq!(AuthError::TokenRevoked.kind(), ErrorKind::Unauthenticated);
        assert_eq!(AuthError::UserExists.kind(), ErrorKind::Conflict);
        assert_eq!(AuthError::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            AuthError::store_unavailable("redis down").kind(),
            ErrorKind::StoreUnavailable
        );
    }

    #[test]
    fn test_public_message_hides_details() {
        assert_eq!(
            AuthError::invalid_token("bad signature").public_message(),
            ACCESS_DENIED
        );
        assert_eq!(
            AuthError::store_unavailable("connection refused at 10.0.0.3").public_message(),
            INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::invalid_request("Name is required").public_message(),
            "Name is required"
        );
    }

    #[test]
    fn test_from_storage_error() {
        let err: AuthError = StorageError::already_exists("user", "a@b.io").into();
        assert!(matches!(err, AuthError::UserExists));

        let err: AuthError = StorageError::timeout("user.find_by_email").into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::TokenRevoked.is_unauthenticated());
        assert!(AuthError::unauthorized("missing").is_unauthenticated());
        assert!(!AuthError::UserExists.is_unauthenticated());
    }
}
