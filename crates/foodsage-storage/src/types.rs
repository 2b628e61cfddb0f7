//! Records held by the credential store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// User
// =============================================================================

/// A registered user.
///
/// The password hash is kept on the record for login verification and is
/// never part of [`UserProfile`], which is what leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique identifier (UUID v4 string).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address, unique across users.
    pub email: String,

    /// PHC-formatted password hash.
    pub password_hash: String,

    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates a new user with a freshly generated ID.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Returns the public view of this user.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// User record without credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Inventory
// =============================================================================

/// A user's inventory together with its version stamp.
///
/// A stored record always holds at least one item; the version starts at 1
/// and increases by one on every successful write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryRecord {
    /// Owner of the inventory.
    pub user_id: String,

    /// Item names, unique and kept in sorted order.
    pub items: BTreeSet<String>,

    /// Version stamp used for conditional writes.
    pub version: u64,
}

impl InventoryRecord {
    /// Returns the items as a list, in sorted order.
    #[must_use]
    pub fn item_list(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }
}
