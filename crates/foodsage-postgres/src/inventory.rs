//! Inventory store on the `inventory` table.
//!
//! Each write is one statement whose `WHERE` clause carries the version the
//! caller read. Zero affected rows means another writer got there first.

use std::collections::BTreeSet;

use async_trait::async_trait;
use foodsage_storage::{InventoryRecord, InventoryStorage, StorageError, StorageResult};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;

use crate::{PostgresStorage, map_sqlx_error, version_from_db, version_to_db};

fn record_from_tuple(row: (String, Vec<String>, i64)) -> StorageResult<InventoryRecord> {
    Ok(InventoryRecord {
        user_id: row.0,
        items: row.1.into_iter().collect(),
        version: version_from_db(row.2)?,
    })
}

impl PostgresStorage {
    /// Reads the current version, for reporting a lost conditional write.
    async fn current_version(&self, user_id: &str) -> StorageResult<Option<u64>> {
        let version: Option<i64> =
            query_scalar("SELECT version FROM inventory WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await
                .map_err(|e| map_sqlx_error("inventory.version", e))?;

        version.map(version_from_db).transpose()
    }
}

#[async_trait]
impl InventoryStorage for PostgresStorage {
    async fn get(&self, user_id: &str) -> StorageResult<Option<InventoryRecord>> {
        let row: Option<(String, Vec<String>, i64)> = query_as(
            r#"
            SELECT user_id, items, version
            FROM inventory
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("inventory.get", e))?;

        row.map(record_from_tuple).transpose()
    }

    async fn put(
        &self,
        user_id: &str,
        items: &BTreeSet<String>,
        expected: Option<u64>,
    ) -> StorageResult<InventoryRecord> {
        if items.is_empty() {
            return Err(StorageError::invalid_input(
                "inventory record must hold at least one item",
            ));
        }
        let items: Vec<String> = items.iter().cloned().collect();

        let row: Option<(String, Vec<String>, i64)> = match expected {
            None => query_as(
                r#"
                INSERT INTO inventory (user_id, items, version)
                VALUES ($1, $2, 1)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING user_id, items, version
                "#,
            )
            .bind(user_id)
            .bind(items)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("inventory.put", e))?,
            Some(version) => query_as(
                r#"
                UPDATE inventory
                SET items = $2, version = version + 1
                WHERE user_id = $1 AND version = $3
                RETURNING user_id, items, version
                "#,
            )
            .bind(user_id)
            .bind(items)
            .bind(version_to_db(version)?)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("inventory.put", e))?,
        };

        match row {
            Some(row) => record_from_tuple(row),
            None => {
                let actual = self.current_version(user_id).await?;
                Err(StorageError::version_conflict(expected, actual))
            }
        }
    }

    async fn delete(&self, user_id: &str, expected: u64) -> StorageResult<()> {
        let deleted = query("DELETE FROM inventory WHERE user_id = $1 AND version = $2")
            .bind(user_id)
            .bind(version_to_db(expected)?)
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("inventory.delete", e))?
            .rows_affected();

        if deleted == 0 {
            let actual = self.current_version(user_id).await?;
            return Err(StorageError::version_conflict(Some(expected), actual));
        }
        Ok(())
    }
}
