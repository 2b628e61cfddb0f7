//! Inventory mutations under concurrent access.
//!
//! The store has no atomic "add to set" primitive, only whole-record writes.
//! Each mutation therefore reads the record, computes the new item set and
//! writes it back conditionally on the version it read. A writer that loses
//! the race gets `VersionConflict`, re-reads and recomputes, so no update is
//! ever silently overwritten.

use std::collections::BTreeSet;
use std::time::Duration;

use foodsage_storage::{DynInventoryStorage, InventoryRecord};
use rand::Rng;

use crate::config::InventoryConfig;
use crate::error::{ITEM_REQUIRED, InventoryError};

/// What a mutation wants written back.
enum Write {
    Put(BTreeSet<String>),
    Delete,
}

/// Consistency-preserving operations on per-user inventories.
#[derive(Clone)]
pub struct InventoryEngine {
    store: DynInventoryStorage,
    config: InventoryConfig,
}

impl InventoryEngine {
    #[must_use]
    pub fn new(store: DynInventoryStorage, config: InventoryConfig) -> Self {
        Self { store, config }
    }

    /// Returns the user's items in sorted order.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InventoryNotFound` if the user has no items
    /// - `InventoryError::Storage` if the store fails
    pub async fn get_inventory(&self, user_id: &str) -> Result<Vec<String>, InventoryError> {
        self.store
            .get(user_id)
            .await?
            .map(|record| record.item_list())
            .ok_or_else(|| InventoryError::InventoryNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Adds `item` to the user's inventory, creating the record if needed.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InvalidItem` if the item is blank
    /// - `InventoryError::ItemExists` if the item is already present
    /// - `InventoryError::Contended` if every attempt lost a race
    /// - `InventoryError::Storage` if the store fails
    pub async fn add_item(
        &self,
        user_id: &str,
        item: &str,
    ) -> Result<InventoryRecord, InventoryError> {
        let item = normalize_item(item)?;

        let written = self
            .mutate(user_id, "add_item", |current| {
                let mut items = current.map(|r| r.items.clone()).unwrap_or_default();
                if !items.insert(item.clone()) {
                    return Err(InventoryError::ItemExists { item: item.clone() });
                }
                Ok(Write::Put(items))
            })
            .await?;

        tracing::debug!(user_id, item = %item, "item added");
        written.ok_or_else(|| InventoryError::InventoryNotFound {
            user_id: user_id.to_string(),
        })
    }

    /// Removes `item` from the user's inventory.
    ///
    /// Removing the last item deletes the record. Returns the remaining
    /// record, or `None` if it was deleted.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InvalidItem` if the item is blank
    /// - `InventoryError::ItemNotFound` if the item is not present
    /// - `InventoryError::Contended` if every attempt lost a race
    /// - `InventoryError::Storage` if the store fails
    pub async fn remove_item(
        &self,
        user_id: &str,
        item: &str,
    ) -> Result<Option<InventoryRecord>, InventoryError> {
        let item = normalize_item(item)?;

        let written = self
            .mutate(user_id, "remove_item", |current| {
                let mut items = current.map(|r| r.items.clone()).unwrap_or_default();
                if !items.remove(&item) {
                    return Err(InventoryError::ItemNotFound { item: item.clone() });
                }
                if items.is_empty() {
                    Ok(Write::Delete)
                } else {
                    Ok(Write::Put(items))
                }
            })
            .await?;

        tracing::debug!(user_id, item = %item, deleted = written.is_none(), "item removed");
        Ok(written)
    }

    /// Runs one read-modify-write cycle per attempt until a conditional
    /// write succeeds or the attempt budget is spent.
    async fn mutate<F>(
        &self,
        user_id: &str,
        operation: &'static str,
        mut apply: F,
    ) -> Result<Option<InventoryRecord>, InventoryError>
    where
        F: FnMut(Option<&InventoryRecord>) -> Result<Write, InventoryError>,
    {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let current = self.store.get(user_id).await?;
            let expected = current.as_ref().map(|r| r.version);

            let result = match apply(current.as_ref())? {
                Write::Put(items) => self.store.put(user_id, &items, expected).await.map(Some),
                Write::Delete => match expected {
                    Some(version) => self.store.delete(user_id, version).await.map(|()| None),
                    // apply only asks for a delete after removing an item,
                    // which requires a record to exist.
                    None => return Ok(None),
                },
            };

            match result {
                Ok(written) => return Ok(written),
                Err(e) if e.is_version_conflict() => {
                    tracing::debug!(
                        user_id,
                        operation,
                        attempt,
                        error = %e,
                        "lost conditional write, retrying"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(user_id, operation, max_attempts, "inventory update contended");
        Err(InventoryError::Contended {
            user_id: user_id.to_string(),
            attempts: max_attempts,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.backoff_base();
        if base.is_zero() {
            return Duration::ZERO;
        }
        let linear = base.saturating_mul(attempt);
        let jitter_ms = rand::thread_rng().gen_range(0..=self.config.backoff_base_ms);
        (linear + Duration::from_millis(jitter_ms)).min(self.config.backoff_max())
    }
}

/// Trims an item name and rejects blank ones.
///
/// # Errors
///
/// Returns `InventoryError::InvalidItem` if nothing is left after trimming.
pub fn normalize_item(item: &str) -> Result<String, InventoryError> {
    let item = item.trim();
    if item.is_empty() {
        return Err(InventoryError::invalid_item(ITEM_REQUIRED));
    }
    Ok(item.to_string())
}
