//! Inventory error types.

use foodsage_storage::{ErrorKind, StorageError};

pub const ITEM_REQUIRED: &str = "Item is required";

/// Errors returned by the inventory engine.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The item name is missing or blank.
    #[error("Invalid item: {message}")]
    InvalidItem {
        /// Human-readable reason, returned to the caller as is.
        message: String,
    },

    /// The user has no inventory record.
    #[error("Inventory not found for user {user_id}")]
    InventoryNotFound {
        /// Owner of the missing inventory.
        user_id: String,
    },

    /// The item is already in the inventory.
    #[error("Item already exists: {item}")]
    ItemExists {
        /// The duplicate item.
        item: String,
    },

    /// The item is not in the inventory.
    #[error("Item not found: {item}")]
    ItemNotFound {
        /// The missing item.
        item: String,
    },

    /// Every attempt lost against a concurrent writer.
    #[error("Inventory update for user {user_id} still conflicting after {attempts} attempts")]
    Contended {
        /// Owner of the contended inventory.
        user_id: String,
        /// How many attempts were made.
        attempts: u32,
    },

    /// The store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl InventoryError {
    /// Creates a new `InvalidItem` error.
    #[must_use]
    pub fn invalid_item(message: impl Into<String>) -> Self {
        Self::InvalidItem {
            message: message.into(),
        }
    }

    /// Returns `true` for the not-found variants.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InventoryNotFound { .. } | Self::ItemNotFound { .. }
        )
    }

    /// Returns `true` if the item was already present.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ItemExists { .. })
    }

    /// Returns the service-level kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidItem { .. } => ErrorKind::Validation,
            Self::InventoryNotFound { .. } => ErrorKind::NotFound,
            Self::ItemExists { .. } => ErrorKind::Conflict,
            Self::ItemNotFound { .. } => ErrorKind::NotFound,
            Self::Contended { .. } => ErrorKind::StoreUnavailable,
            // A version conflict never leaves the retry loop; anything the
            // store reports past it is a store failure.
            Self::Storage(e) if e.is_version_conflict() => ErrorKind::StoreUnavailable,
            Self::Storage(e) => e.kind(),
        }
    }

    /// Returns the message sent to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidItem { message } => message.clone(),
            Self::InventoryNotFound { .. } => "Inventory not found".to_string(),
            Self::ItemExists { .. } => "Item already exists".to_string(),
            Self::ItemNotFound { .. } => "Item not found".to_string(),
            Self::Contended { .. } | Self::Storage(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(
            InventoryError::invalid_item(ITEM_REQUIRED).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            InventoryError::ItemExists {
                item: "milk".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            InventoryError::Contended {
                user_id: "u".into(),
                attempts: 8
            }
            .kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            InventoryError::from(StorageError::timeout("inventory.get")).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            InventoryError::from(StorageError::version_conflict(Some(1), Some(2))).kind(),
            ErrorKind::StoreUnavailable
        );
    }

    #[test]
    fn test_public_messages() {
        assert_eq!(
            InventoryError::InventoryNotFound {
                user_id: "u".into()
            }
            .public_message(),
            "Inventory not found"
        );
        assert_eq!(
            InventoryError::from(StorageError::connection_error("10.0.0.1 refused"))
                .public_message(),
            "Internal server error"
        );
    }
}
