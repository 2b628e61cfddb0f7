//! JWT encoding and decoding.
//!
//! Session tokens are HS256-signed JWTs. The signing secret and issuer are
//! fixed for the life of the process.
//!
//! ## Example
//!
//! ```ignore
//! use foodsage_auth::token::jwt::{JwtService, SessionClaims};
//!
//! let jwt = JwtService::new(secret.as_bytes(), "foodsage");
//! let token = jwt.encode(&claims)?;
//! let data = jwt.decode(&token)?;
//! ```

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Issuer.
    pub iss: String,

    /// Subject (user ID).
    pub sub: String,

    /// Issued at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,

    /// Unique token ID.
    pub jti: String,
}

impl SessionClaims {
    /// Builds claims for `subject` valid from `issued_at` until `expires_at`.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Returns the expiration as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Service for encoding and decoding session JWTs.
///
/// This service is thread-safe (`Send + Sync`) and can be shared across
/// async tasks.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Creates a new JWT service.
    ///
    /// # Arguments
    /// * `secret` - The HMAC secret used for signing and verification
    /// * `issuer` - The issuer claim value
    #[must_use]
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
        }
    }

    /// Encodes claims into a JWT string.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and validates a JWT string.
    ///
    /// Expiry is checked without leeway: a token is rejected as soon as its
    /// `exp` second has passed.
    ///
    /// # Errors
    /// Returns an error if decoding or validation fails.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::from)
    }

    /// Returns the issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

// ============================================================================
// Tests
// ============================================================================
