//! Authentication context types.

use std::time::Duration;

use time::OffsetDateTime;

use crate::error::AuthError;
use crate::revocation::remaining_lifetime;

/// Authenticated request context.
///
/// Produced by the session guard once a token has passed the revocation and
/// verification checks. Carries the token itself so logout can revoke it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user_id: String,
    token: String,
    expires_at: OffsetDateTime,
}

impl AuthContext {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        token: impl Into<String>,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            expires_at,
        }
    }

    /// The acting user.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The bearer token that authenticated the request.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// Time left until the token expires, at least one second.
    #[must_use]
    pub fn remaining_lifetime(&self) -> Duration {
        remaining_lifetime(self.expires_at)
    }

    /// Checks that the acting user is `owner`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the identities differ.
    pub fn ensure_owner(&self, owner: &str) -> Result<(), AuthError> {
        if self.user_id == owner {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %self.user_id,
                target = %owner,
                "rejected access to another user's resource"
            );
            Err(AuthError::forbidden("cannot access another user's resource"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        let ctx = AuthContext::new(
            "u1",
            "tok",
            OffsetDateTime::now_utc() + time::Duration::minutes(5),
        );
        assert!(ctx.ensure_owner("u1").is_ok());
        assert!(matches!(
            ctx.ensure_owner("u2"),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_remaining_lifetime_floor() {
        let ctx = AuthContext::new("u1", "tok", OffsetDateTime::UNIX_EPOCH);
        assert_eq!(ctx.remaining_lifetime(), Duration::from_secs(1));
    }
}
