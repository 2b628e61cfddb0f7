//! # foodsage-auth
//!
//! Session lifecycle for the FoodSage service.
//!
//! ## Modules
//!
//! - [`config`] - token and revocation settings
//! - [`token`] - issuing and verifying session tokens
//! - [`revocation`] - the denylist of logged-out tokens
//! - [`guard`] - request authorization built from the two above
//! - [`accounts`] - register, login, profile and logout
//! - [`password`] - Argon2 password hashing
//! - [`middleware`] - axum extractor and error responses

pub mod accounts;
pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod revocation;
pub mod token;
pub mod validation;

pub use accounts::{AccountService, LoginRequest, LoginResponse, RegisterRequest};
pub use config::{AuthConfig, ConfigError, RevocationFailurePolicy};
pub use error::AuthError;
pub use guard::{SessionGuard, extract_token};
pub use middleware::{AuthContext, BearerAuth};
pub use revocation::{
    LocalRevocationStore, RedisRevocationStore, RevocationError, RevocationStore,
};
pub use token::{InvalidReason, IssuedToken, TokenService, TokenVerdict};

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
