//! Credential store on the `users` table.

use async_trait::async_trait;
use foodsage_storage::{StorageError, StorageResult, User, UserStorage};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{PostgresStorage, map_sqlx_error};

type UserTuple = (Uuid, String, String, String, OffsetDateTime);

fn user_from_tuple(row: UserTuple) -> User {
    User {
        id: row.0.to_string(),
        name: row.1,
        email: row.2,
        password_hash: row.3,
        created_at: row.4,
    }
}

#[async_trait]
impl UserStorage for PostgresStorage {
    async fn find_by_id(&self, user_id: &str) -> StorageResult<Option<User>> {
        // Ids are always UUIDs; anything else cannot match a row.
        let Ok(id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };

        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("users.find_by_id", e))?;

        Ok(row.map(user_from_tuple))
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("users.find_by_email", e))?;

        Ok(row.map(user_from_tuple))
    }

    async fn create(&self, user: &User) -> StorageResult<()> {
        let id = Uuid::parse_str(&user.id)
            .map_err(|e| StorageError::invalid_input(format!("user id is not a UUID: {e}")))?;

        let result = query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if let sqlx_core::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return Err(StorageError::already_exists("user", &user.email));
                }
                Err(map_sqlx_error("users.create", e))
            }
        }
    }
}
