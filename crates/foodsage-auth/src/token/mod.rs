//! Session token management.
//!
//! - [`jwt`] - HS256 encoding and decoding of session claims
//! - [`service`] - issuing tokens and turning untrusted input into a verdict

pub mod jwt;
pub mod service;

pub use jwt::{JwtError, JwtService, SessionClaims};
pub use service::{InvalidReason, IssuedToken, TokenService, TokenVerdict};
