//! Service-wide error classification.

use std::fmt;

/// How a failure should be reported to a caller.
///
/// Every layer's error type maps onto one of these kinds; the HTTP layer
/// turns a kind into a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request is malformed or fails an input rule.
    Validation,
    /// No usable credentials were presented.
    Unauthenticated,
    /// The caller is authenticated but may not act on the target.
    Forbidden,
    /// The requested record or item does not exist.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// A backing store is unreachable, slow, or contended.
    StoreUnavailable,
    /// A bug or unexpected internal failure.
    Internal,
}

impl ErrorKind {
    /// Returns `true` for kinds caused by the caller rather than the service.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        !matches!(self, Self::StoreUnavailable | Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
