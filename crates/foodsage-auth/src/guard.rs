//! Session guard.
//!
//! Every protected operation runs through [`SessionGuard::authorize`]:
//!
//! 1. no token in the `Authorization` header: `Unauthorized`
//! 2. token on the revocation list: `TokenRevoked`
//! 3. token fails verification: `InvalidToken`
//! 4. otherwise the token's subject becomes the acting identity
//!
//! The revocation lookup comes first so a logged-out token is refused even
//! though its signature and expiry are still fine.

use std::sync::Arc;

use crate::config::RevocationFailurePolicy;
use crate::error::AuthError;
use crate::middleware::AuthContext;
use crate::revocation::RevocationStore;
use crate::token::{TokenService, TokenVerdict};

/// Authorizes requests by bearer token.
#[derive(Clone)]
pub struct SessionGuard {
    tokens: Arc<TokenService>,
    revocations: Arc<dyn RevocationStore>,
    failure_policy: RevocationFailurePolicy,
}

impl SessionGuard {
    #[must_use]
    pub fn new(
        tokens: Arc<TokenService>,
        revocations: Arc<dyn RevocationStore>,
        failure_policy: RevocationFailurePolicy,
    ) -> Self {
        Self {
            tokens,
            revocations,
            failure_policy,
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    #[must_use]
    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    /// Authorizes a request given its raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `AuthError::Unauthorized` if no token was presented
    /// - `AuthError::TokenRevoked` if the token was logged out
    /// - `AuthError::InvalidToken` if verification fails
    /// - `AuthError::StoreUnavailable` if the revocation store cannot answer
    ///   and the policy is fail-closed
    pub async fn authorize(&self, header: Option<&str>) -> Result<AuthContext, AuthError> {
        let Some(token) = header.and_then(extract_token) else {
            return Err(AuthError::unauthorized("Missing Authorization header"));
        };

        if self.check_revoked(token).await? {
            tracing::debug!("rejected revoked token");
            return Err(AuthError::TokenRevoked);
        }

        match self.tokens.verify(token) {
            TokenVerdict::Valid {
                subject,
                expires_at,
            } => Ok(AuthContext::new(subject, token, expires_at)),
            TokenVerdict::Invalid(reason) => {
                tracing::debug!(%reason, "rejected invalid token");
                Err(AuthError::invalid_token(reason.to_string()))
            }
        }
    }

    async fn check_revoked(&self, token: &str) -> Result<bool, AuthError> {
        match self.revocations.is_revoked(token).await {
            Ok(revoked) => Ok(revoked),
            Err(e) => match self.failure_policy {
                RevocationFailurePolicy::FailClosed => {
                    tracing::error!(error = %e, "revocation lookup failed, rejecting request");
                    Err(AuthError::from(e))
                }
                RevocationFailurePolicy::FailOpen => {
                    tracing::warn!(error = %e, "revocation lookup failed, accepting token");
                    Ok(false)
                }
            },
        }
    }
}

/// Pulls the token out of an `Authorization` header value.
///
/// Accepts both `Bearer <token>` and a bare token. Returns `None` for an
/// empty value.
#[must_use]
pub fn extract_token(header: &str) -> Option<&str> {
    let value = header.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then_some(token)
}
