//! Error type returned by request handlers.

use axum::response::{IntoResponse, Response};
use foodsage_auth::AuthError;
use foodsage_auth::middleware::error_response;
use foodsage_inventory::InventoryError;

/// Failure of a request handler, rendered as `{"message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::Inventory(e) => {
                let kind = e.kind();
                if !kind.is_client_error() {
                    tracing::error!(error = %e, "inventory request failed");
                }
                error_response(kind, &e.public_message())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use foodsage_storage::StorageError;

    use super::*;

    #[test]
    fn test_inventory_statuses() {
        let cases = [
            (InventoryError::invalid_item("Item is required"), StatusCode::BAD_REQUEST),
            (
                InventoryError::ItemExists { item: "milk".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::ItemNotFound { item: "milk".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                InventoryError::Contended {
                    user_id: "u1".into(),
                    attempts: 8,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                InventoryError::from(StorageError::internal("bug")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_auth_errors_keep_their_response() {
        let response = ApiError::from(AuthError::TokenRevoked).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(
            response
                .headers()
                .contains_key(axum::http::header::WWW_AUTHENTICATE)
        );
    }
}
