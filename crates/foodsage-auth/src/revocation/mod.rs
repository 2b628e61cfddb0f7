//! Revoked token tracking.
//!
//! Logging out puts the token on a denylist until it would have expired on
//! its own. Entries are keyed by the SHA-256 digest of the token so the
//! cache never holds a usable bearer credential.
//!
//! Two backends are provided:
//! - [`LocalRevocationStore`] - process-local, for tests and single-node runs
//! - [`RedisRevocationStore`] - shared across instances through Redis

mod local;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

pub use self::local::LocalRevocationStore;
pub use self::redis_store::{RedisRevocationStore, create_redis_pool};

/// Key prefix of revocation entries.
pub const KEY_PREFIX: &str = "revoked:";

/// Value stored under a revocation key.
pub const REVOKED_MARKER: &str = "revoked";

/// Errors raised by a revocation store.
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    /// The store did not answer within its deadline.
    #[error("Revocation store timed out during {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
    },

    /// The store could not be reached.
    #[error("Revocation store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The store answered with an error.
    #[error("Revocation store error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl RevocationError {
    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Storage for revoked tokens.
///
/// # Idempotency
///
/// Revoking an already revoked token succeeds and refreshes its TTL.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks `token` as revoked for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot record the entry.
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError>;

    /// Returns `true` if `token` is currently revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot answer. Callers decide what an
    /// unanswered lookup means.
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError>;
}

/// Returns the cache key for `token`.
#[must_use]
pub fn revocation_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}

/// How long a revocation entry for a token expiring at `expires_at` must live.
///
/// Never less than one second, so a token on the edge of expiry is still
/// recorded.
#[must_use]
pub fn remaining_lifetime(expires_at: OffsetDateTime) -> Duration {
    let remaining = expires_at - OffsetDateTime::now_utc();
    let secs = u64::try_from(remaining.whole_seconds()).unwrap_or(0);
    Duration::from_secs(secs.max(1))
}
