//! Account operations: register, login, profile and logout.

use std::sync::Arc;

use foodsage_storage::{DynUserStorage, User, UserProfile};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::middleware::AuthContext;
use crate::password::{hash_password_async, verify_password_async};
use crate::revocation::RevocationStore;
use crate::token::{IssuedToken, TokenService};
use crate::validation::{normalize_email, validate_email, validate_name, validate_password};

/// Registration request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// User-facing account operations.
#[derive(Clone)]
pub struct AccountService {
    users: DynUserStorage,
    tokens: Arc<TokenService>,
    revocations: Arc<dyn RevocationStore>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        users: DynUserStorage,
        tokens: Arc<TokenService>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            users,
            tokens,
            revocations,
        }
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRequest` if a field fails validation
    /// - `AuthError::UserExists` if the email is taken
    /// - `AuthError::StoreUnavailable` if the store cannot answer
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AuthError> {
        validate_name(&request.name)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let email = normalize_email(&request.email);
        if self.users.find_by_email(&email).await?.is_some() {
            tracing::debug!("registration rejected: email already in use");
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password_async(request.password).await?;
        let user = User::new(request.name.trim(), email, password_hash);

        // The store re-checks uniqueness, so a concurrent registration for
        // the same email still ends in UserExists.
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.profile())
    }

    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRequest` if a field fails validation
    /// - `AuthError::InvalidCredentials` if the email is unknown or the password is wrong
    /// - `AuthError::StoreUnavailable` if the store cannot answer
    pub async fn login(&self, request: LoginRequest) -> Result<IssuedToken, AuthError> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let email = normalize_email(&request.email);
        let user = self.users.find_by_email(&email).await?;

        let matches = verify_password_async(
            request.password,
            user.as_ref().map(|u| u.password_hash.clone()),
        )
        .await?;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                tracing::debug!("login rejected: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let issued = self
            .tokens
            .issue(&user.id, self.tokens.lifetime())
            .map_err(|e| AuthError::internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(issued)
    }

    /// Returns the profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// - `AuthError::UserNotFound` if the user no longer exists
    /// - `AuthError::StoreUnavailable` if the store cannot answer
    pub async fn profile(&self, auth: &AuthContext) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_id(auth.user_id())
            .await?
            .map(|user| user.profile())
            .ok_or(AuthError::UserNotFound)
    }

    /// Revokes the token that authenticated the request.
    ///
    /// The revocation entry lives exactly as long as the token would have.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the revocation store cannot
    /// record the entry; the token then stays usable and the client must
    /// retry.
    pub async fn logout(&self, auth: &AuthContext) -> Result<(), AuthError> {
        self.revocations
            .revoke(auth.token(), auth.remaining_lifetime())
            .await?;
        tracing::info!(user_id = %auth.user_id(), "user logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use foodsage_storage::MemoryStorage;

    use super::*;
    use crate::revocation::LocalRevocationStore;
    use crate::token::{JwtService, TokenVerdict};
    use crate::validation::{EMAIL_INVALID, NAME_REQUIRED, PASSWORD_TOO_SHORT};

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(TokenService::new(
                JwtService::new(b"0123456789abcdef0123456789abcdef", "foodsage"),
                Duration::from_secs(3600),
            )),
            Arc::new(LocalRevocationStore::new()),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ann".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login_resolves_user() {
        let accounts = service();
        let profile = accounts
            .register(register_request("ann@example.com"))
            .await
            .unwrap();

        let issued = accounts
            .login(login_request("ann@example.com", "secret1"))
            .await
            .unwrap();

        match accounts.tokens.verify(&issued.token) {
            TokenVerdict::Valid { subject, .. } => assert_eq!(subject, profile.id),
            other => panic!("expected valid token, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let accounts = service();

        let mut request = register_request("not-an-email");
        request.name = String::new();
        request.password = "123".to_string();
        let err = accounts.register(request).await.unwrap_err();
        assert_eq!(err.public_message(), NAME_REQUIRED);

        let mut request = register_request("not-an-email");
        request.password = "123".to_string();
        let err = accounts.register(request).await.unwrap_err();
        assert_eq!(err.public_message(), EMAIL_INVALID);

        let mut request = register_request("ann@example.com");
        request.password = "123".to_string();
        let err = accounts.register(request).await.unwrap_err();
        assert_eq!(err.public_message(), PASSWORD_TOO_SHORT);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let accounts = service();
        accounts
            .register(register_request("ann@example.com"))
            .await
            .unwrap();

        let err = accounts
            .register(register_request("ANN@example.com "))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let accounts = service();
        accounts
            .register(register_request("ann@example.com"))
            .await
            .unwrap();

        let wrong_password = accounts
            .login(login_request("ann@example.com", "wrong-password"))
            .await
            .unwrap_err();
        let unknown_email = accounts
            .login(login_request("bob@example.com", "wrong-password"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.kind(), unknown_email.kind());
    }

    #[tokio::test]
    async fn test_profile_and_logout() {
        let accounts = service();
        let profile = accounts
            .register(register_request("ann@example.com"))
            .await
            .unwrap();
        let issued = accounts
            .login(login_request("ann@example.com", "secret1"))
            .await
            .unwrap();
        let auth = AuthContext::new(&profile.id, &issued.token, issued.expires_at);

        let fetched = accounts.profile(&auth).await.unwrap();
        assert_eq!(fetched, profile);

        accounts.logout(&auth).await.unwrap();
        assert!(accounts.revocations.is_revoked(&issued.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_for_missing_user() {
        let accounts = service();
        let auth = AuthContext::new(
            "ghost",
            "tok",
            time::OffsetDateTime::now_utc() + time::Duration::minutes(1),
        );
        assert!(matches!(
            accounts.profile(&auth).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
