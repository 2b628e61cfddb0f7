//! Storage traits for users and inventories.
//!
//! Backends implement these over whatever key-value engine they wrap. The
//! only capabilities required are point lookup by key, lookup by the unique
//! email attribute, and conditional put/delete for inventory records.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::StorageResult;
use crate::types::{InventoryRecord, User};

/// Storage operations for users.
///
/// # Example
///
/// ```ignore
/// use foodsage_storage::UserStorage;
///
/// async fn example(storage: &dyn UserStorage) {
///     if let Some(user) = storage.find_by_email("ann@example.com").await? {
///         println!("Found user: {}", user.id);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> StorageResult<Option<User>>;

    /// Find a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the email is already taken.
    async fn create(&self, user: &User) -> StorageResult<()>;
}

/// Storage operations for inventory records.
///
/// Writes are conditional on the version the caller last read, so two
/// writers racing on the same user cannot silently overwrite each other:
/// exactly one wins and the other receives `StorageError::VersionConflict`.
#[async_trait]
pub trait InventoryStorage: Send + Sync {
    /// Reads the inventory record for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, user_id: &str) -> StorageResult<Option<InventoryRecord>>;

    /// Writes the full item set for a user.
    ///
    /// `expected` is the version last read, or `None` if the record was
    /// absent. On success the stored record is returned with its new version.
    ///
    /// # Errors
    ///
    /// - `StorageError::VersionConflict` if the stored version differs from `expected`
    /// - `StorageError::InvalidInput` if `items` is empty
    async fn put(
        &self,
        user_id: &str,
        items: &BTreeSet<String>,
        expected: Option<u64>,
    ) -> StorageResult<InventoryRecord>;

    /// Deletes the inventory record for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::VersionConflict` if the record is absent or its
    /// version differs from `expected`.
    async fn delete(&self, user_id: &str, expected: u64) -> StorageResult<()>;
}
