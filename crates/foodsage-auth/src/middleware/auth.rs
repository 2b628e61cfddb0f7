//! Bearer token authentication extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use foodsage_auth::middleware::BearerAuth;
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.user_id())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(app_state);
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::guard::SessionGuard;

use super::types::AuthContext;

/// Axum extractor that runs the [`SessionGuard`] on the request.
///
/// The application state must provide the guard through `FromRef`:
///
/// ```ignore
/// impl FromRef<AppState> for SessionGuard {
///     fn from_ref(state: &AppState) -> Self {
///         state.guard.clone()
///     }
/// }
/// ```
///
/// # Errors
///
/// Rejects with `AuthError` (which implements `IntoResponse`) if the header
/// is missing, the token is revoked or invalid, or the revocation store is
/// down under a fail-closed policy.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    SessionGuard: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = SessionGuard::from_ref(state);

        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                tracing::debug!("Authorization header is not valid ASCII");
                AuthError::unauthorized("Malformed Authorization header")
            })?),
            None => None,
        };

        let context = guard.authorize(header).await?;
        tracing::debug!(user_id = %context.user_id(), "Token validated successfully");

        Ok(BearerAuth(context))
    }
}
