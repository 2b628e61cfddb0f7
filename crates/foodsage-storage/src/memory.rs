//! In-memory storage backend.
//!
//! Users and inventories live in [`DashMap`]s. Uniqueness of email and the
//! version check of conditional writes are both decided while holding the
//! shard lock of the entry API, so they are atomic with respect to other
//! writers on the same key.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::StorageResult;
use crate::error::StorageError;
use crate::traits::{InventoryStorage, UserStorage};
use crate::types::{InventoryRecord, User};

/// In-memory credential store.
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    users: Arc<DashMap<String, User>>,
    /// email -> user id
    emails: Arc<DashMap<String, String>>,
    inventories: Arc<DashMap<String, InventoryRecord>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored inventory records.
    #[must_use]
    pub fn inventory_count(&self) -> usize {
        self.inventories.len()
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn find_by_id(&self, user_id: &str) -> StorageResult<Option<User>> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn create(&self, user: &User) -> StorageResult<()> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StorageError::already_exists("user", &user.email)),
            Entry::Vacant(slot) => {
                // Insert the user before releasing the email slot so a
                // concurrent find_by_email never sees a dangling id.
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                tracing::debug!(user_id = %user.id, "user created (memory)");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl InventoryStorage for MemoryStorage {
    async fn get(&self, user_id: &str) -> StorageResult<Option<InventoryRecord>> {
        Ok(self.inventories.get(user_id).map(|r| r.value().clone()))
    }

    async fn put(
        &self,
        user_id: &str,
        items: &BTreeSet<String>,
        expected: Option<u64>,
    ) -> StorageResult<InventoryRecord> {
        if items.is_empty() {
            return Err(StorageError::invalid_input(
                "empty inventories are deleted, not stored",
            ));
        }

        match self.inventories.entry(user_id.to_string()) {
            Entry::Occupied(mut current) => {
                let actual = current.get().version;
                if expected != Some(actual) {
                    return Err(StorageError::version_conflict(expected, Some(actual)));
                }
                let record = InventoryRecord {
                    user_id: user_id.to_string(),
                    items: items.clone(),
                    version: actual + 1,
                };
                current.insert(record.clone());
                Ok(record)
            }
            Entry::Vacant(slot) => {
                if expected.is_some() {
                    return Err(StorageError::version_conflict(expected, None));
                }
                let record = InventoryRecord {
                    user_id: user_id.to_string(),
                    items: items.clone(),
                    version: 1,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn delete(&self, user_id: &str, expected: u64) -> StorageResult<()> {
        match self.inventories.entry(user_id.to_string()) {
            Entry::Occupied(current) => {
                let actual = current.get().version;
                if actual != expected {
                    return Err(StorageError::version_conflict(Some(expected), Some(actual)));
                }
                current.remove();
                Ok(())
            }
            Entry::Vacant(_) => Err(StorageError::version_conflict(Some(expected), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let storage = MemoryStorage::new();
        let user = User::new("Ann", "ann@example.com", "hash");
        storage.create(&user).await.unwrap();

        let by_id = storage.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ann@example.com");

        let by_email = storage.find_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(storage.find_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = MemoryStorage::new();
        storage
            .create(&User::new("Ann", "ann@example.com", "h1"))
            .await
            .unwrap();
        let err = storage
            .create(&User::new("Other Ann", "ann@example.com", "h2"))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_put_insert_then_update_bumps_version() {
        let storage = MemoryStorage::new();
        let first = storage.put("u1", &items(&["milk"]), None).await.unwrap();
        assert_eq!(first.version, 1);

        let second = storage
            .put("u1", &items(&["milk", "eggs"]), Some(1))
            .await
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(storage.get("u1").await.unwrap().unwrap(), second);
    }

    #[tokio::test]
    async fn test_put_with_stale_version_conflicts() {
        let storage = MemoryStorage::new();
        storage.put("u1", &items(&["milk"]), None).await.unwrap();

        let err = storage.put("u1", &items(&["eggs"]), None).await.unwrap_err();
        assert!(err.is_version_conflict());

        storage.put("u1", &items(&["milk", "eggs"]), Some(1)).await.unwrap();
        let err = storage.put("u1", &items(&["bread"]), Some(1)).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::VersionConflict {
                expected: Some(1),
                actual: Some(2)
            }
        ));
    }

    #[tokio::test]
    async fn test_put_empty_set_rejected() {
        let storage = MemoryStorage::new();
        let err = storage.put("u1", &BTreeSet::new(), None).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput { .. }));
        assert_eq!(storage.inventory_count(), 0);
    }

    #[tokio::test]
    async fn test_conditional_delete() {
        let storage = MemoryStorage::new();
        storage.put("u1", &items(&["milk"]), None).await.unwrap();

        assert!(storage.delete("u1", 7).await.unwrap_err().is_version_conflict());
        storage.delete("u1", 1).await.unwrap();
        assert!(storage.get("u1").await.unwrap().is_none());
        assert!(storage.delete("u1", 1).await.unwrap_err().is_version_conflict());
    }
}
