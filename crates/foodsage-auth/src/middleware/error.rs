//! Error response handling for authentication middleware.
//!
//! Errors go out as `{"message": "..."}` JSON. 401 responses also carry a
//! `WWW-Authenticate` challenge.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use foodsage_storage::ErrorKind;
use serde_json::json;

use crate::error::AuthError;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const REALM: &str = "foodsage";

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if !kind.is_client_error() {
            tracing::error!(error = %self, "request failed");
        }

        let message = self.public_message();
        let mut response = error_response(kind, &message);

        if response.status() == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(self.bearer_error_code(), &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}

/// Maps an error kind to its HTTP status.
///
/// Conflicts are reported as 400, matching what existing clients expect for
/// a duplicate registration or item.
#[must_use]
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds a `{"message": ...}` JSON response for `kind`.
#[must_use]
pub fn error_response(kind: ErrorKind, message: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (status_for(kind), headers, Json(json!({ "message": message }))).into_response()
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer realm="foodsage", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"{}\", error=\"{}\", error_description=\"{}\"",
        REALM, error, escaped_desc
    )
}

// =============================================================================
// Tests
// =============================================================================
