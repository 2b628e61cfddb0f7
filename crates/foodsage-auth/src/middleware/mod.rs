//! HTTP glue for authentication.
//!
//! - [`BearerAuth`] - extractor running the session guard on a request
//! - [`AuthContext`] - the identity bound to an authenticated request
//! - error responses for [`AuthError`](crate::AuthError) and the shared
//!   status mapping used by the rest of the service

pub mod auth;
pub mod error;
pub mod types;

pub use auth::BearerAuth;
pub use error::{error_response, status_for};
pub use types::AuthContext;
