//! Issuing and verifying session tokens.

use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

use crate::config::AuthConfig;

use super::jwt::{JwtError, JwtService, SessionClaims};

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The encoded token.
    pub token: String,
    /// When the token stops being valid.
    pub expires_at: OffsetDateTime,
}

/// Outcome of verifying a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    /// Signature, issuer and expiry all check out.
    Valid {
        /// The user the token was issued to.
        subject: String,
        /// When the token expires.
        expires_at: OffsetDateTime,
    },
    /// The token must not be accepted.
    Invalid(InvalidReason),
}

impl TokenVerdict {
    /// Returns the subject if the token is valid.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Valid { subject, .. } => Some(subject),
            Self::Invalid(_) => None,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Not a structurally valid JWT.
    Malformed,
    /// Signed with a different key.
    BadSignature,
    /// Past its expiry.
    Expired,
    /// Wrong issuer or a required claim is missing.
    InvalidClaims,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::BadSignature => write!(f, "bad_signature"),
            Self::Expired => write!(f, "expired"),
            Self::InvalidClaims => write!(f, "invalid_claims"),
        }
    }
}

impl From<&JwtError> for InvalidReason {
    fn from(err: &JwtError) -> Self {
        match err {
            JwtError::Expired => Self::Expired,
            JwtError::InvalidSignature => Self::BadSignature,
            JwtError::InvalidClaims { .. } => Self::InvalidClaims,
            JwtError::EncodingError { .. } | JwtError::DecodingError { .. } => Self::Malformed,
        }
    }
}

/// Signs and verifies session tokens.
///
/// Stateless apart from the signing key; revocation is the job of the
/// revocation store.
pub struct TokenService {
    jwt: JwtService,
    lifetime: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(jwt: JwtService, lifetime: Duration) -> Self {
        Self { jwt, lifetime }
    }

    /// Builds the service from validated configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            JwtService::new(config.jwt_secret.as_bytes(), config.issuer.clone()),
            config.token_lifetime,
        )
    }

    /// Default lifetime of issued tokens.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for `user_id` that expires after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if signing fails or `now + ttl` is
    /// not a representable date.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<IssuedToken, JwtError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = time::Duration::try_from(ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                JwtError::encoding_error(format!("token lifetime {ttl:?} out of range"))
            })?;
        let claims = SessionClaims::new(self.jwt.issuer(), user_id, now, expires_at);
        let token = self.jwt.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Verifies a token.
    ///
    /// Never fails: any problem with untrusted input becomes an
    /// [`TokenVerdict::Invalid`] with the reason.
    #[must_use]
    pub fn verify(&self, token: &str) -> TokenVerdict {
        match self.jwt.decode(token) {
            Ok(claims) => TokenVerdict::Valid {
                expires_at: claims.expires_at(),
                subject: claims.sub,
            },
            Err(e) => TokenVerdict::Invalid(InvalidReason::from(&e)),
        }
    }
}
