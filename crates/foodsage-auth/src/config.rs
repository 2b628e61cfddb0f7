//! Session and token configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum length of the token signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Authentication configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "foodsage"
/// jwt_secret = "change-me-to-a-long-random-value-of-32-bytes"
/// token_lifetime = "1h"
/// revocation_failure_policy = "fail_closed"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value of the `iss` claim; tokens from any other issuer are rejected.
    pub issuer: String,

    /// HMAC secret used to sign and verify tokens.
    pub jwt_secret: String,

    /// How long an issued token stays valid.
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,

    /// What the session guard does when the revocation store cannot answer.
    pub revocation_failure_policy: RevocationFailurePolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "foodsage".to_string(),
            jwt_secret: String::new(),
            token_lifetime: Duration::from_secs(3600),
            revocation_failure_policy: RevocationFailurePolicy::default(),
        }
    }
}

/// Behavior of the session guard when the revocation store is unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationFailurePolicy {
    /// Reject the request. A logged-out token can never slip through.
    #[default]
    FailClosed,
    /// Treat the token as not revoked and log a warning.
    FailOpen,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the signing secret is empty and
    /// `ConfigError::InvalidValue` if it is too short, the issuer is empty, or
    /// the token lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("auth.jwt_secret".to_string()));
        }

        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "token_lifetime must be > 0".to_string(),
            ));
        }

        if self.token_lifetime > MAX_TOKEN_LIFETIME {
            return Err(ConfigError::InvalidValue(format!(
                "token_lifetime must not exceed {}",
                humantime_serde::re::humantime::format_duration(MAX_TOKEN_LIFETIME)
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            jwt_secret: "x".repeat(MIN_SECRET_LEN),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "foodsage");
        assert_eq!(config.token_lifetime, Duration::from_secs(3600));
        assert_eq!(
            config.revocation_failure_policy,
            RevocationFailurePolicy::FailClosed
        );
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let mut config = valid();
        config.jwt_secret = "short".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn test_zero_lifetime_fails_validation() {
        let mut config = valid();
        config.token_lifetime = Duration::ZERO;
        assert!(config.validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_oversized_lifetime_fails_validation() {
        let config: AuthConfig = serde_json::from_str(&format!(
            r#"{{"jwt_secret": "{}", "token_lifetime": "100000000y"}}"#,
            "x".repeat(MIN_SECRET_LEN)
        ))
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_lifetime"));

        let mut config = valid();
        config.token_lifetime = MAX_TOKEN_LIFETIME;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_humantime_lifetime_parses() {
        let config: AuthConfig = serde_json::from_str(
            r#"{"token_lifetime": "15m", "revocation_failure_policy": "fail_open"}"#,
        )
        .unwrap();
        assert_eq!(config.token_lifetime, Duration::from_secs(900));
        assert_eq!(
            config.revocation_failure_policy,
            RevocationFailurePolicy::FailOpen
        );
    }
}
